use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::models::{CandidateQuery, Question, SqlParam};

pub const ATTENDANCE_QUERY: &str =
    "SELECT Name, AttendancePercentage FROM Students ORDER BY AttendancePercentage DESC, Name ASC";
pub const TOP_SCORE_QUERY: &str =
    "SELECT Name, ClassID, ExamScore FROM Students ORDER BY ExamScore DESC, Name ASC LIMIT 1";
pub const LOWEST_SCORE_QUERY: &str =
    "SELECT Name, ClassID, ExamScore FROM Students ORDER BY ExamScore ASC, Name ASC LIMIT 1";
pub const UNPAID_FEES_QUERY: &str = "SELECT Name, \
     (TuitionFees + TransportFees + ExamFees - FeesPaid) AS BalanceDue \
     FROM Students \
     WHERE TuitionFees + TransportFees + ExamFees > FeesPaid \
     ORDER BY BalanceDue DESC, Name ASC";
pub const CLASS_ROSTER_QUERY: &str = "SELECT StudentID, Name, Age, ClassID, Status \
     FROM Students WHERE ClassID = ?1 ORDER BY Name ASC";

/// One keyword rule; rules are tried in [`fallback_rules`] order and the first
/// match wins.
pub struct FallbackRule {
    pub name: &'static str,
    pattern: Regex,
    build: fn(&Captures<'_>) -> Option<CandidateQuery>,
}

impl FallbackRule {
    fn new(
        name: &'static str,
        pattern: &str,
        build: fn(&Captures<'_>) -> Option<CandidateQuery>,
    ) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("fallback rule regex should compile"),
            build,
        }
    }

    fn apply(&self, normalized: &str) -> Option<CandidateQuery> {
        self.pattern
            .captures(normalized)
            .and_then(|captures| (self.build)(&captures))
    }
}

impl std::fmt::Debug for FallbackRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackRule")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

pub fn fallback_rules() -> &'static [FallbackRule] {
    static RULES: OnceLock<Vec<FallbackRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            FallbackRule::new(
                "attendance",
                r"\b(attendance|attendence|present|absent|absences?)\b",
                |_| Some(CandidateQuery::fallback(ATTENDANCE_QUERY)),
            ),
            FallbackRule::new(
                "top_score",
                r"\b(top|highest|rank|ranked|ranking|best|topper)\b",
                |_| Some(CandidateQuery::fallback(TOP_SCORE_QUERY)),
            ),
            FallbackRule::new(
                "lowest_score",
                r"\b(lowest|worst|bottom|weakest)\b",
                |_| Some(CandidateQuery::fallback(LOWEST_SCORE_QUERY)),
            ),
            FallbackRule::new(
                "unpaid_fees",
                r"\b(fee|fees|unpaid|dues|balance|pending payments?)\b",
                |_| Some(CandidateQuery::fallback(UNPAID_FEES_QUERY)),
            ),
            FallbackRule::new("class_roster", r"\b(?:class|grade)\s*(\d{1,9})\b", |captures| {
                let class_id = captures.get(1)?.as_str().parse::<i64>().ok()?;
                Some(
                    CandidateQuery::fallback(CLASS_ROSTER_QUERY)
                        .with_param(SqlParam::Integer(class_id)),
                )
            }),
        ]
    })
}

/// Rule-based synthesis; no I/O, same text in gives the same query out.
#[must_use]
pub fn fallback(question: &Question) -> Option<CandidateQuery> {
    let normalized = question.normalized();
    fallback_rules().iter().find_map(|rule| {
        let candidate = rule.apply(normalized)?;
        tracing::info!(rule = rule.name, sql = %candidate.text, "fallback rule matched");
        Some(candidate)
    })
}

#[cfg(test)]
mod tests {
    use super::{
        ATTENDANCE_QUERY, CLASS_ROSTER_QUERY, LOWEST_SCORE_QUERY, TOP_SCORE_QUERY,
        UNPAID_FEES_QUERY, fallback, fallback_rules,
    };
    use crate::models::{QueryOrigin, Question, SqlParam};

    fn sql_for(text: &str) -> Option<String> {
        fallback(&Question::new(text)).map(|candidate| candidate.text)
    }

    #[test]
    fn rules_are_listed_in_priority_order() {
        let names = fallback_rules()
            .iter()
            .map(|rule| rule.name)
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                "attendance",
                "top_score",
                "lowest_score",
                "unpaid_fees",
                "class_roster"
            ]
        );
    }

    #[test]
    fn each_rule_produces_its_fixed_query() {
        assert_eq!(sql_for("Attendance report").as_deref(), Some(ATTENDANCE_QUERY));
        assert_eq!(sql_for("top student").as_deref(), Some(TOP_SCORE_QUERY));
        assert_eq!(sql_for("who has the LOWEST marks").as_deref(), Some(LOWEST_SCORE_QUERY));
        assert_eq!(sql_for("students with unpaid fees").as_deref(), Some(UNPAID_FEES_QUERY));
        assert_eq!(sql_for("list grade 4").as_deref(), Some(CLASS_ROSTER_QUERY));
    }

    #[test]
    fn attendance_outranks_class_number() {
        let candidate = fallback(&Question::new("show me attendance for class 5"))
            .expect("attendance rule should match");
        assert_eq!(candidate.text, ATTENDANCE_QUERY);
        assert!(candidate.params.is_empty());
    }

    #[test]
    fn class_number_is_bound_not_interpolated() {
        let candidate =
            fallback(&Question::new("students in class 12")).expect("class rule should match");
        assert_eq!(candidate.origin, QueryOrigin::Fallback);
        assert!(!candidate.text.contains("12"));
        assert_eq!(candidate.params, vec![SqlParam::Integer(12)]);

        let compact = fallback(&Question::new("Class7")).expect("compact form should match");
        assert_eq!(compact.params, vec![SqlParam::Integer(7)]);
    }

    #[test]
    fn unmatched_questions_yield_nothing() {
        assert_eq!(sql_for("what is the weather"), None);
        assert_eq!(sql_for("classes"), None);
        assert_eq!(sql_for(""), None);
    }

    #[test]
    fn same_text_gives_identical_output() {
        for text in ["top student", "class 3 please", "fees", "nothing here"] {
            assert_eq!(
                fallback(&Question::new(text)),
                fallback(&Question::new(text)),
                "{text}"
            );
        }
    }
}
