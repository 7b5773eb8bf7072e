use std::fmt::Write as _;

use serde_json::Value;

use crate::config::FormatMode;
use crate::error::PipelineError;
use crate::llm::LanguageModel;
use crate::models::{QueryResult, Question, ResultSet};

use super::template::{no_records_message, render_template};

const FORMAT_RULES: &[&str] = &[
    "Group duplicate data (same scores, same parent names) instead of repeating it.",
    "Summarize efficiently; never list identical details more than once.",
    "Use emoji as bullet points for key facts and keep the layout consistent.",
    "No commentary before or after the formatted response.",
    "The user message is a data request, not a greeting: do not greet.",
];

const CARD_TEMPLATE: &str = "\
━━━━━━━━━━━━━━━━━━━━━━━
📌 Student Details:
🔹 Studentid: 19
🔹 Name: Student 19
🔹 Age: 6
🔹 Classid: 4
🔹 Tuitionfees: 50000.00
🔹 Feespaid: 32229.21
🔹 Attendancepercentage: 98.00
🔹 Examscore: 88.00
🔹 Status: Active
━━━━━━━━━━━━━━━━━━━━━━━";

pub struct ResponseFormatter<'a> {
    mode: FormatMode,
    model: Option<&'a dyn LanguageModel>,
}

impl<'a> ResponseFormatter<'a> {
    #[must_use]
    pub fn new(mode: FormatMode, model: Option<&'a dyn LanguageModel>) -> Self {
        Self { mode, model }
    }

    /// Failures and empty results render the no-records text on every path. The
    /// model path reports `FormattingFailure` when the call errors or comes back
    /// blank.
    pub fn render(&self, question: &Question, result: &QueryResult) -> Result<String, PipelineError> {
        let result_set = match result {
            QueryResult::Rows(result_set) if !result_set.is_empty() => result_set,
            _ => return Ok(no_records_message(question)),
        };

        match (self.mode, self.model) {
            (FormatMode::Model, Some(model)) => format_with_model(model, question, result_set),
            _ => Ok(render_template(question, result)),
        }
    }
}

fn format_with_model(
    model: &dyn LanguageModel,
    question: &Question,
    result_set: &ResultSet,
) -> Result<String, PipelineError> {
    let prompt = build_format_prompt(question, result_set);
    tracing::debug!(model = model.name(), prompt_len = prompt.len(), "requesting formatting");

    let formatted = model.generate(&prompt).map_err(|error| {
        tracing::warn!(model = model.name(), %error, "formatting call failed");
        PipelineError::FormattingFailure(error.to_string())
    })?;
    let formatted = formatted.trim();
    if formatted.is_empty() {
        tracing::warn!(model = model.name(), "formatting call returned blank text");
        return Err(PipelineError::FormattingFailure(
            "model returned blank text".to_string(),
        ));
    }

    Ok(formatted.to_string())
}

#[must_use]
pub fn build_format_prompt(question: &Question, result_set: &ResultSet) -> String {
    let records = result_set
        .records()
        .into_iter()
        .map(Value::Object)
        .collect::<Vec<_>>();
    let records = serde_json::to_string_pretty(&records).unwrap_or_else(|_| "[]".to_string());

    let mut prompt = String::from(
        "Format the following student records in a compact, human-friendly format.\n",
    );
    let _ = writeln!(prompt, "\n### User query\n\"{}\"", question.trimmed());
    prompt.push_str("\n### Rules\n");
    for rule in FORMAT_RULES {
        let _ = writeln!(prompt, "- {rule}");
    }
    let _ = writeln!(
        prompt,
        "\n### Example layout\n📢 Here are the student details you requested!\n{CARD_TEMPLATE}\n📝 Let me know if you need additional details."
    );
    let _ = writeln!(prompt, "\n### Records\n{records}");
    prompt
}
