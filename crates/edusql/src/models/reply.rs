use serde::Serialize;

use super::query::CandidateQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Welcome,
    Greeting,
    Answer,
    NoRecords,
    NotUnderstood,
    FetchFailed,
    FormatFailed,
}

impl ReplyKind {
    #[must_use]
    pub const fn as_key(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Greeting => "greeting",
            Self::Answer => "answer",
            Self::NoRecords => "no_records",
            Self::NotUnderstood => "not_understood",
            Self::FetchFailed => "fetch_failed",
            Self::FormatFailed => "format_failed",
        }
    }

    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(
            self,
            Self::NotUnderstood | Self::FetchFailed | Self::FormatFailed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub kind: ReplyKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<CandidateQuery>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,

    pub chunks: Vec<String>,

    /// Internal cause of a failure reply; logged, never shown to the user.
    #[serde(skip)]
    pub detail: Option<String>,
}

impl Reply {
    #[must_use]
    pub fn new(kind: ReplyKind, chunks: Vec<String>) -> Self {
        Self {
            kind,
            query: None,
            row_count: None,
            chunks,
            detail: None,
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: CandidateQuery) -> Self {
        self.query = Some(query);
        self
    }

    #[must_use]
    pub fn with_row_count(mut self, row_count: usize) -> Self {
        self.row_count = Some(row_count);
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.chunks.concat()
    }
}
