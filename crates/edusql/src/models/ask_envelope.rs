use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::Serialize;
use serde_json::{Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::query::{QueryOrigin, SqlParam};
use super::reply::{Reply, ReplyKind};

pub const ASK_ENVELOPE_SCHEMA_VERSION: &str = "edusql.ask-envelope.v1";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskEnvelopeError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskEnvelope {
    pub ok: bool,
    pub question: String,
    pub generated_at_utc: String,
    pub reply_kind: ReplyKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<QueryOrigin>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<SqlParam>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,

    pub chunks: Vec<String>,
    pub meta: BTreeMap<String, Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<AskEnvelopeError>,
}

impl AskEnvelope {
    #[must_use]
    pub fn from_reply(question: &str, reply: &Reply) -> Self {
        let mut meta = BTreeMap::new();
        meta.insert(
            "schema_version".to_string(),
            json!(ASK_ENVELOPE_SCHEMA_VERSION),
        );
        meta.insert("chunk_count".to_string(), json!(reply.chunks.len()));

        let error = reply.kind.is_failure().then(|| AskEnvelopeError {
            code: reply.kind.as_key().to_string(),
            message: reply.text(),
        });
        let query = reply.query.as_ref();

        Self {
            ok: error.is_none(),
            question: question.to_string(),
            generated_at_utc: generated_at_utc_now(),
            reply_kind: reply.kind,
            origin: query.map(|query| query.origin),
            sql: query.map(|query| query.text.clone()),
            params: query.map(|query| query.params.clone()).unwrap_or_default(),
            row_count: reply.row_count,
            chunks: reply.chunks.clone(),
            meta,
            error,
        }
    }

    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }
}

/// Raised by `ask` when no reply could be produced from the database.
#[derive(Debug, Clone)]
pub struct UnansweredQuestion {
    pub kind: ReplyKind,
    pub detail: String,
}

impl Display for UnansweredQuestion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "question not answered ({}): {}", self.kind.as_key(), self.detail)
    }
}

impl std::error::Error for UnansweredQuestion {}

fn generated_at_utc_now() -> String {
    let now = OffsetDateTime::now_utc();
    let now = now.replace_nanosecond(0).unwrap_or(now);
    now.format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
