//! Language-model seam shared by query synthesis and response formatting.

mod gemini;

pub use gemini::{DEFAULT_GEMINI_ENDPOINT, GeminiClient};

use crate::error::LlmError;

pub trait LanguageModel: Send + Sync {
    fn name(&self) -> &str;

    /// One completion for `prompt`. Empty output is reported as [`LlmError::EmptyResponse`].
    fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
