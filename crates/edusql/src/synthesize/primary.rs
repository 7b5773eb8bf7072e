use crate::error::{LlmError, PipelineError};
use crate::llm::LanguageModel;
use crate::models::{CandidateQuery, Question};
use crate::schema::SchemaDescriptor;

use super::is_greeting;
use super::prompt::build_generation_prompt;

#[derive(Debug)]
pub enum Synthesis {
    Greeting,
    Candidate(CandidateQuery),
    Failed(PipelineError),
}

/// Model-backed synthesis. Holds borrowed configuration only, so one instance can
/// be built per request.
pub struct PrimarySynthesizer<'a> {
    schema: &'a SchemaDescriptor,
    model: Option<&'a dyn LanguageModel>,
}

impl<'a> PrimarySynthesizer<'a> {
    #[must_use]
    pub fn new(schema: &'a SchemaDescriptor, model: Option<&'a dyn LanguageModel>) -> Self {
        Self { schema, model }
    }

    pub fn synthesize(&self, question: &Question) -> Synthesis {
        if is_greeting(question) {
            return Synthesis::Greeting;
        }

        let Some(model) = self.model else {
            return Synthesis::Failed(PipelineError::GenerationFailure(
                LlmError::Unavailable.to_string(),
            ));
        };

        let prompt = build_generation_prompt(self.schema, question);
        tracing::debug!(model = model.name(), prompt_len = prompt.len(), "requesting query");
        let raw = match model.generate(&prompt) {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(model = model.name(), %error, "query generation call failed");
                return Synthesis::Failed(PipelineError::GenerationFailure(error.to_string()));
            }
        };

        match clean_model_output(&raw) {
            Some(sql) => {
                tracing::info!(%sql, "generated query");
                Synthesis::Candidate(CandidateQuery::primary(sql))
            }
            None => {
                tracing::warn!(output = %raw.trim(), "model output is not a SELECT ... FROM query");
                Synthesis::Failed(PipelineError::GenerationFailure(
                    "model output is not a SELECT ... FROM query".to_string(),
                ))
            }
        }
    }
}

/// Strips a surrounding code fence and `--` comment lines; `None` unless the rest
/// starts with `select` and names a `from` clause.
#[must_use]
pub fn clean_model_output(raw: &str) -> Option<String> {
    let unfenced = strip_code_fence(raw.trim());
    let cleaned = unfenced
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");
    let cleaned = cleaned.trim();

    let normalized = cleaned.to_ascii_lowercase();
    let has_from = normalized
        .split(|ch: char| !ch.is_ascii_alphanumeric() && ch != '_')
        .any(|token| token == "from");
    (normalized.starts_with("select") && has_from).then(|| cleaned.to_string())
}

fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return text;
    };

    let tag_len = inner
        .chars()
        .take_while(char::is_ascii_alphanumeric)
        .count();
    let (tag, rest) = inner.split_at(tag_len);
    if tag.is_empty() || tag.eq_ignore_ascii_case("sql") || tag.eq_ignore_ascii_case("sqlite") {
        rest.trim()
    } else {
        inner.trim()
    }
}
