use rusqlite::types::Value as SqlValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryOrigin {
    Primary,
    Fallback,
}

impl QueryOrigin {
    #[must_use]
    pub const fn as_key(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlParam {
    Integer(i64),
}

impl SqlParam {
    #[must_use]
    pub fn to_sql_value(&self) -> SqlValue {
        match self {
            Self::Integer(value) => SqlValue::Integer(*value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateQuery {
    pub text: String,
    pub origin: QueryOrigin,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<SqlParam>,
}

impl CandidateQuery {
    #[must_use]
    pub fn primary(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: QueryOrigin::Primary,
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: QueryOrigin::Fallback,
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_param(mut self, param: SqlParam) -> Self {
        self.params.push(param);
        self
    }
}
