use thiserror::Error;

pub const NOT_UNDERSTOOD_MESSAGE: &str =
    "😕 Sorry, I couldn’t understand your request. Try rephrasing it.";
pub const FETCH_FAILED_MESSAGE: &str = "⚠️ There was an error fetching data. Please try again.";
pub const FORMAT_FAILED_MESSAGE: &str = "⚠️ Could not format the response. Please try again!";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("language model is not configured")]
    Unavailable,

    #[error("language model request failed: {0}")]
    Transport(String),

    #[error("language model returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("language model returned an empty response")]
    EmptyResponse,

    #[error("failed to decode language model response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("failed to open database {path}: {cause}")]
    Open { path: String, cause: String },

    #[error("failed to prepare query: {0}")]
    Prepare(String),

    #[error("query execution failed: {0}")]
    Query(String),

    #[error("query exceeded the {0} ms time limit")]
    TimedOut(u128),

    #[error("failed to decode query column: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be absolute: {1}")]
    NotAbsolute(&'static str, String),

    #[error("unsupported home expansion syntax (only `~` and `~/...` are supported): {0}")]
    UnsupportedHomeExpansion(String),

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("query generation failed: {0}")]
    GenerationFailure(String),

    #[error("candidate query rejected: {0}")]
    ValidationRejection(String),

    #[error("query execution failed: {0}")]
    ExecutionFailure(String),

    #[error("response formatting failed: {0}")]
    FormattingFailure(String),
}

impl PipelineError {
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::GenerationFailure(_) | Self::ValidationRejection(_) => NOT_UNDERSTOOD_MESSAGE,
            Self::ExecutionFailure(_) => FETCH_FAILED_MESSAGE,
            Self::FormattingFailure(_) => FORMAT_FAILED_MESSAGE,
        }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::GenerationFailure(_) => "generation_failure",
            Self::ValidationRejection(_) => "validation_rejection",
            Self::ExecutionFailure(_) => "execution_failure",
            Self::FormattingFailure(_) => "formatting_failure",
        }
    }
}
