use serde::Serialize;

use crate::models::CandidateQuery;

/// Matched as whole words anywhere in the text. Other writes are stopped by the
/// executor's read-only connection.
const FORBIDDEN_KEYWORDS: &[&str] = &[
    "drop", "delete", "alter", "insert", "update", "truncate", "exec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    EmptyStatement,
    NotSelect,
    ForbiddenKeyword,
    CommentMarker,
    MultiStatement,
}

impl RejectionReason {
    #[must_use]
    pub const fn as_key(self) -> &'static str {
        match self {
            Self::EmptyStatement => "empty_statement",
            Self::NotSelect => "not_select",
            Self::ForbiddenKeyword => "forbidden_keyword",
            Self::CommentMarker => "comment_marker",
            Self::MultiStatement => "multi_statement",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub reason: RejectionReason,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected: Option<String>,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.reason.as_key())
    }
}

impl std::error::Error for Rejection {}

/// A candidate that passed [`validate`]. The executor only accepts this type.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedQuery {
    candidate: CandidateQuery,
}

impl ValidatedQuery {
    #[must_use]
    pub fn candidate(&self) -> &CandidateQuery {
        &self.candidate
    }

    #[must_use]
    pub fn into_candidate(self) -> CandidateQuery {
        self.candidate
    }
}

pub fn validate(candidate: CandidateQuery) -> Result<ValidatedQuery, Rejection> {
    let statement = strip_trailing_semicolons(&candidate.text);
    if statement.is_empty() {
        return Err(rejection(
            RejectionReason::EmptyStatement,
            "query is empty",
            None,
        ));
    }

    let normalized = statement.to_ascii_lowercase();
    if !normalized.starts_with("select") || leading_keyword(&normalized) != "select" {
        let leading = leading_keyword(&normalized);
        return Err(rejection(
            RejectionReason::NotSelect,
            "only SELECT statements are allowed",
            Some(leading),
        ));
    }

    if let Some(keyword) = first_forbidden_keyword(&normalized) {
        return Err(rejection(
            RejectionReason::ForbiddenKeyword,
            format!("keyword `{keyword}` is not allowed"),
            Some(keyword),
        ));
    }

    if let Some(marker) = ["--", "/*", "*/"]
        .into_iter()
        .find(|marker| statement.contains(marker))
    {
        return Err(rejection(
            RejectionReason::CommentMarker,
            "comments are not allowed in queries",
            Some(marker.to_string()),
        ));
    }

    if statement.contains(';') {
        return Err(rejection(
            RejectionReason::MultiStatement,
            "exactly one statement is allowed",
            None,
        ));
    }

    Ok(ValidatedQuery { candidate })
}

fn strip_trailing_semicolons(raw_sql: &str) -> &str {
    let mut candidate = raw_sql.trim();
    while let Some(stripped) = candidate.strip_suffix(';') {
        candidate = stripped.trim_end();
    }
    candidate
}

fn sql_tokens(normalized_sql: &str) -> impl Iterator<Item = &str> {
    normalized_sql
        .split(|ch: char| !ch.is_ascii_alphanumeric() && ch != '_')
        .filter(|token| !token.is_empty())
}

fn first_forbidden_keyword(normalized_sql: &str) -> Option<String> {
    sql_tokens(normalized_sql)
        .find(|token| FORBIDDEN_KEYWORDS.contains(token))
        .map(ToString::to_string)
}

fn leading_keyword(normalized_sql: &str) -> String {
    sql_tokens(normalized_sql)
        .next()
        .unwrap_or("unknown")
        .to_string()
}

fn rejection(
    reason: RejectionReason,
    message: impl Into<String>,
    detected: Option<String>,
) -> Rejection {
    Rejection {
        reason,
        message: message.into(),
        detected,
    }
}

#[cfg(test)]
mod tests {
    use super::{RejectionReason, validate};
    use crate::models::{CandidateQuery, QueryOrigin};

    fn reason_for(sql: &str) -> RejectionReason {
        validate(CandidateQuery::primary(sql))
            .expect_err("query should be rejected")
            .reason
    }

    #[test]
    fn accepts_select_with_optional_trailing_semicolon() {
        let validated = validate(CandidateQuery::primary("SELECT Name FROM Students"))
            .expect("plain select should pass");
        assert_eq!(validated.candidate().origin, QueryOrigin::Primary);
        assert!(validate(CandidateQuery::fallback("  select 1 from Students ; ")).is_ok());
    }

    #[test]
    fn rejects_blank_and_non_select_statements() {
        assert_eq!(reason_for("   \n"), RejectionReason::EmptyStatement);
        assert_eq!(reason_for(";"), RejectionReason::EmptyStatement);
        assert_eq!(
            reason_for("WITH x AS (SELECT 1) SELECT * FROM x"),
            RejectionReason::NotSelect
        );
        assert_eq!(reason_for("selected FROM t"), RejectionReason::NotSelect);
        assert_eq!(reason_for("SHOW TABLES"), RejectionReason::NotSelect);
    }

    #[test]
    fn rejects_destructive_keywords_in_any_case() {
        for sql in [
            "SELECT * FROM Students; DROP TABLE Students",
            "select 1 from t where x in (delete from t)",
            "SELECT * FROM Students WHERE 1=1 UNION SELECT * FROM t Alter",
            "SELECT * FROM (INSERT INTO t VALUES (1))",
            "SELECT * FROM t WHERE Update = 1",
            "SELECT * FROM t truncate",
            "SELECT EXEC FROM t",
        ] {
            assert_eq!(reason_for(sql), RejectionReason::ForbiddenKeyword, "{sql}");
        }
    }

    #[test]
    fn keyword_match_is_whole_word_only() {
        assert!(validate(CandidateQuery::primary("SELECT updated_on, dropout FROM Logs")).is_ok());
        assert!(
            validate(CandidateQuery::primary(
                "SELECT Name FROM Students WHERE Remarks LIKE '%Deleted%'"
            ))
            .is_ok()
        );
    }

    #[test]
    fn read_only_filters_on_ordinary_words_are_accepted() {
        for sql in [
            "SELECT Name, PhoneNumber FROM Parents WHERE Name = 'Grant'",
            "SELECT Name FROM Students WHERE Remarks LIKE '%merge%'",
            "SELECT Name FROM Teachers WHERE Email LIKE '%create%'",
            "SELECT COUNT(*) AS execute_count FROM Students",
        ] {
            assert!(validate(CandidateQuery::primary(sql)).is_ok(), "{sql}");
        }
    }

    #[test]
    fn rejects_comments_and_stacked_statements() {
        assert_eq!(
            reason_for("SELECT Name FROM Students -- WHERE 1=0"),
            RejectionReason::CommentMarker
        );
        assert_eq!(
            reason_for("SELECT Name /* x */ FROM Students"),
            RejectionReason::CommentMarker
        );
        assert_eq!(
            reason_for("SELECT 1 FROM t; SELECT 2 FROM t"),
            RejectionReason::MultiStatement
        );
    }

    #[test]
    fn rejection_records_detected_keyword() {
        let rejection = validate(CandidateQuery::primary("SELECT * FROM t; DELETE FROM t"))
            .expect_err("delete must be rejected");
        assert_eq!(rejection.detected.as_deref(), Some("delete"));
        assert!(rejection.to_string().contains("forbidden_keyword"));
    }
}
