use crate::models::ResultSet;

const NAME_COLUMNS: &[&str] = &["Name", "StudentName"];
const CLASS_COLUMNS: &[&str] = &["ClassID", "ClassName"];
const SCORE_COLUMNS: &[&str] = &["ExamScore", "MarksObtained"];
const AMOUNT_COLUMNS: &[&str] = &["BalanceDue", "FeesPaid", "AmountPaid"];

/// Closed set of result layouts the templates know. Indices point into
/// `ResultSet::columns`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    Attendance {
        name: usize,
        percentage: usize,
    },
    ExamScore {
        name: usize,
        class: Option<usize>,
        score: usize,
    },
    Fees {
        name: usize,
        amount: usize,
    },
    Generic,
}

impl ResultShape {
    /// Checks run attendance, exam score, fees; the first that fits wins.
    #[must_use]
    pub fn classify(result_set: &ResultSet) -> Self {
        let Some(name) = first_present(result_set, NAME_COLUMNS) else {
            return Self::Generic;
        };

        if let Some(percentage) = result_set.column_index("AttendancePercentage") {
            return Self::Attendance { name, percentage };
        }
        if let Some(score) = first_present(result_set, SCORE_COLUMNS) {
            return Self::ExamScore {
                name,
                class: first_present(result_set, CLASS_COLUMNS),
                score,
            };
        }
        if let Some(amount) = first_present(result_set, AMOUNT_COLUMNS) {
            return Self::Fees { name, amount };
        }
        Self::Generic
    }

    #[must_use]
    pub const fn as_key(self) -> &'static str {
        match self {
            Self::Attendance { .. } => "attendance",
            Self::ExamScore { .. } => "exam_score",
            Self::Fees { .. } => "fees",
            Self::Generic => "generic",
        }
    }
}

fn first_present(result_set: &ResultSet, candidates: &[&str]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|column| result_set.column_index(column))
}
