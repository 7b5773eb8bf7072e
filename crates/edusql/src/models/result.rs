use rusqlite::types::Value as SqlValue;
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    DbError,
}

impl FailureKind {
    #[must_use]
    pub const fn as_key(self) -> &'static str {
        match self {
            Self::DbError => "db_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryFailure {
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl ResultSet {
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self { columns, rows }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))
    }

    /// One object per row, keys in column order.
    #[must_use]
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(column, value)| (column.clone(), json_value_from_sql(value)))
                    .collect()
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Rows(ResultSet),
    Failure(QueryFailure),
}

impl QueryResult {
    #[must_use]
    pub fn db_error(message: impl Into<String>) -> Self {
        Self::Failure(QueryFailure {
            kind: FailureKind::DbError,
            message: message.into(),
        })
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        match self {
            Self::Rows(result_set) => result_set.rows.len(),
            Self::Failure(_) => 0,
        }
    }
}

#[must_use]
pub fn json_value_from_sql(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(value) => json!(value),
        SqlValue::Real(value) => json!(value),
        SqlValue::Text(value) => json!(value),
        SqlValue::Blob(value) => json!(encode_blob_hex(value)),
    }
}

/// Text form used by the templates: reals drop a trailing `.0`, NULL is a dash.
#[must_use]
pub fn display_sql_value(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => "—".to_string(),
        SqlValue::Integer(value) => value.to_string(),
        SqlValue::Real(value) => value.to_string(),
        SqlValue::Text(value) => value.clone(),
        SqlValue::Blob(value) => encode_blob_hex(value),
    }
}

fn encode_blob_hex(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        output.push(HEX[(byte >> 4) as usize] as char);
        output.push(HEX[(byte & 0x0f) as usize] as char);
    }
    output
}
