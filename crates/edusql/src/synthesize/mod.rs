//! Query synthesis: greeting detection, model-backed generation, and the
//! rule-based fallback.
//!
//! Greeting phrases are matched on word boundaries rather than as raw
//! substrings. `highest` has to reach the top-score fallback rule instead of
//! reading as `hi`, so elongated forms such as `hiya` or `heyyy` are not
//! treated as greetings.

mod fallback;
mod primary;
mod prompt;

pub use fallback::{
    ATTENDANCE_QUERY, CLASS_ROSTER_QUERY, FallbackRule, LOWEST_SCORE_QUERY, TOP_SCORE_QUERY,
    UNPAID_FEES_QUERY, fallback, fallback_rules,
};
pub use primary::{PrimarySynthesizer, Synthesis, clean_model_output};
pub use prompt::{SYNONYM_RULES, build_generation_prompt};

use crate::models::Question;

pub const GREETING_PHRASES: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "good morning",
    "good evening",
    "good afternoon",
];
pub const GREETING_REPLY: &str = "👋 Hello! How can I assist you today?";
pub const WELCOME_REPLY: &str =
    "👋 Hello! Send me a query, and I'll fetch the results from the database in a friendly way.";

/// Case-insensitive phrase match; the phrase must not sit inside a longer word,
/// so `highest` or `which` are not greetings.
#[must_use]
pub fn is_greeting(question: &Question) -> bool {
    let text = question.normalized();
    GREETING_PHRASES
        .iter()
        .any(|phrase| contains_phrase(text, phrase))
}

pub(crate) fn contains_phrase(text: &str, phrase: &str) -> bool {
    text.match_indices(phrase).any(|(start, matched)| {
        let before = text[..start].chars().next_back();
        let after = text[start + matched.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
