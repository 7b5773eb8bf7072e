use rusqlite::types::Value as SqlValue;

use crate::models::{QueryResult, Question, ResultSet, display_sql_value};

use super::shape::ResultShape;

#[must_use]
pub fn no_records_message(question: &Question) -> String {
    format!(
        "⚠️ No matching records found for your query: \"{}\". Please check if the data exists or try a different question.",
        question.trimmed()
    )
}

/// Deterministic formatting, no model involved.
#[must_use]
pub fn render_template(question: &Question, result: &QueryResult) -> String {
    match result {
        QueryResult::Rows(result_set) if !result_set.is_empty() => render_rows(result_set),
        _ => no_records_message(question),
    }
}

fn render_rows(result_set: &ResultSet) -> String {
    let shape = ResultShape::classify(result_set);
    tracing::debug!(shape = shape.as_key(), rows = result_set.rows.len(), "rendering template");

    match shape {
        ResultShape::Attendance { name, percentage } => lines(result_set, |row| {
            format!("{}: {}%", cell(row, name), cell(row, percentage))
        }),
        ResultShape::ExamScore { name, class, score } => lines(result_set, |row| match class {
            Some(class) => format!(
                "{} ({}): {}",
                cell(row, name),
                cell(row, class),
                cell(row, score)
            ),
            None => format!("{}: {}", cell(row, name), cell(row, score)),
        }),
        ResultShape::Fees { name, amount } => lines(result_set, |row| {
            format!("{}: {}", cell(row, name), cell(row, amount))
        }),
        ResultShape::Generic => render_generic(result_set),
    }
}

fn lines(result_set: &ResultSet, line: impl Fn(&[SqlValue]) -> String) -> String {
    result_set
        .rows
        .iter()
        .map(|row| line(row.as_slice()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_generic(result_set: &ResultSet) -> String {
    result_set
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let mut block = format!("📌 Record {}", index + 1);
            for (column, value) in result_set.columns.iter().zip(row) {
                block.push_str(&format!("\n🔹 {column}: {}", display_sql_value(value)));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn cell(row: &[SqlValue], index: usize) -> String {
    row.get(index)
        .map(display_sql_value)
        .unwrap_or_else(|| display_sql_value(&SqlValue::Null))
}

#[cfg(test)]
mod tests {
    use rusqlite::types::Value as SqlValue;

    use super::{no_records_message, render_template};
    use crate::models::{QueryResult, Question, ResultSet};

    fn text(value: &str) -> SqlValue {
        SqlValue::Text(value.to_string())
    }

    fn rows(columns: &[&str], rows: Vec<Vec<SqlValue>>) -> QueryResult {
        QueryResult::Rows(ResultSet::new(
            columns.iter().map(ToString::to_string).collect(),
            rows,
        ))
    }

    #[test]
    fn attendance_rows_render_as_percentages() {
        let result = rows(
            &["Name", "AttendancePercentage"],
            vec![vec![text("Asha"), SqlValue::Real(92.5)]],
        );
        assert_eq!(
            render_template(&Question::new("attendance"), &result),
            "Asha: 92.5%"
        );
    }

    #[test]
    fn exam_scores_show_class_when_present() {
        let question = Question::new("scores");
        let with_class = rows(
            &["Name", "ClassID", "ExamScore"],
            vec![
                vec![text("Asha"), SqlValue::Integer(5), SqlValue::Real(95.0)],
                vec![text("Ravi"), SqlValue::Integer(5), SqlValue::Real(71.5)],
            ],
        );
        assert_eq!(
            render_template(&question, &with_class),
            "Asha (5): 95\nRavi (5): 71.5"
        );

        let without_class = rows(
            &["Name", "MarksObtained"],
            vec![vec![text("Meera"), SqlValue::Integer(88)]],
        );
        assert_eq!(render_template(&question, &without_class), "Meera: 88");
    }

    #[test]
    fn fee_rows_render_name_and_amount() {
        let result = rows(
            &["Name", "BalanceDue"],
            vec![
                vec![text("Kabir"), SqlValue::Real(27000.0)],
                vec![text("Ravi"), SqlValue::Real(17000.0)],
            ],
        );
        insta::assert_snapshot!(render_template(&Question::new("fees"), &result), @r"
        Kabir: 27000
        Ravi: 17000
        ");
    }

    #[test]
    fn unknown_columns_render_as_record_blocks() {
        let result = rows(
            &["StudentID", "Status", "Remarks"],
            vec![
                vec![SqlValue::Integer(1), text("Active"), SqlValue::Null],
                vec![SqlValue::Integer(2), text("Inactive"), text("Moved")],
            ],
        );
        insta::assert_snapshot!(render_template(&Question::new("status"), &result), @r"
        📌 Record 1
        🔹 StudentID: 1
        🔹 Status: Active
        🔹 Remarks: —

        📌 Record 2
        🔹 StudentID: 2
        🔹 Status: Inactive
        🔹 Remarks: Moved
        ");
    }

    #[test]
    fn empty_rows_and_failures_echo_the_question() {
        let question = Question::new("  students in class 9 ");
        let expected = no_records_message(&question);
        assert!(expected.contains("\"students in class 9\""));

        let empty = rows(&["Name", "AttendancePercentage"], Vec::new());
        assert_eq!(render_template(&question, &empty), expected);
        assert_eq!(
            render_template(&question, &QueryResult::db_error("no such table")),
            expected
        );
    }
}
