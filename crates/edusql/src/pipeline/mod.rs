//! One request from question text to reply chunks.

use std::sync::Arc;
use std::time::Instant;

use crate::config::{AppConfig, DEFAULT_MAX_MESSAGE_LEN, FallbackPolicy, FormatMode};
use crate::error::{FORMAT_FAILED_MESSAGE, LlmError, NOT_UNDERSTOOD_MESSAGE, PipelineError};
use crate::llm::{GeminiClient, LanguageModel};
use crate::models::{QueryResult, Question, Reply, ReplyKind};
use crate::render::{ResponseFormatter, chunk_message};
use crate::schema::SchemaDescriptor;
use crate::sqlite::Executor;
use crate::synthesize::{
    GREETING_REPLY, PrimarySynthesizer, Synthesis, WELCOME_REPLY, fallback, is_greeting,
};
use crate::validate::{ValidatedQuery, validate};

enum Selection {
    Greeting,
    Query(ValidatedQuery),
    Unanswerable(PipelineError),
}

/// Holds only immutable configuration, so a single instance serves concurrent
/// requests.
pub struct Pipeline {
    schema: SchemaDescriptor,
    model: Option<Arc<dyn LanguageModel>>,
    executor: Executor,
    format_mode: FormatMode,
    policy: FallbackPolicy,
    max_message_len: usize,
}

impl Pipeline {
    #[must_use]
    pub fn new(schema: SchemaDescriptor, executor: Executor) -> Self {
        Self {
            schema,
            model: None,
            executor,
            format_mode: FormatMode::Template,
            policy: FallbackPolicy::PrimaryThenFallback,
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, LlmError> {
        let executor = Executor::new(config.database_path.clone(), config.query_timeout);
        let mut pipeline = Self::new(SchemaDescriptor::school(), executor)
            .with_format_mode(config.format_mode)
            .with_fallback_policy(config.fallback_policy)
            .with_max_message_len(config.max_message_len);

        match GeminiClient::from_config(&config.model)? {
            Some(client) => pipeline = pipeline.with_model(Arc::new(client)),
            None => tracing::info!("no model api key configured; using rule-based synthesis"),
        }
        Ok(pipeline)
    }

    #[must_use]
    pub fn with_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.model = Some(model);
        self
    }

    #[must_use]
    pub fn with_format_mode(mut self, format_mode: FormatMode) -> Self {
        self.format_mode = format_mode;
        self
    }

    #[must_use]
    pub fn with_fallback_policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_max_message_len(mut self, max_message_len: usize) -> Self {
        self.max_message_len = max_message_len.max(1);
        self
    }

    #[must_use]
    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Never fails: every outcome, including internal errors, is a reply.
    pub fn answer(&self, text: &str) -> Reply {
        let started = Instant::now();
        let question = Question::new(text);
        let reply = self.answer_question(&question);
        tracing::info!(
            kind = reply.kind.as_key(),
            chunks = reply.chunks.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "request finished"
        );
        reply
    }

    fn answer_question(&self, question: &Question) -> Reply {
        if question.is_command("start") {
            return self.reply(ReplyKind::Welcome, WELCOME_REPLY);
        }
        if question.is_empty() {
            return self
                .reply(ReplyKind::NotUnderstood, NOT_UNDERSTOOD_MESSAGE)
                .with_detail("question is empty");
        }

        let validated = match self.select_query(question) {
            Selection::Greeting => return self.reply(ReplyKind::Greeting, GREETING_REPLY),
            Selection::Query(validated) => validated,
            Selection::Unanswerable(error) => {
                tracing::warn!(code = error.code(), %error, "no usable query");
                return self
                    .reply(ReplyKind::NotUnderstood, error.user_message())
                    .with_detail(error.to_string());
            }
        };

        let result = self.executor.execute(&validated);
        let query = validated.into_candidate();
        let row_count = result.row_count();

        if let QueryResult::Failure(failure) = &result {
            let error = PipelineError::ExecutionFailure(failure.message.clone());
            return self
                .reply(ReplyKind::FetchFailed, error.user_message())
                .with_detail(error.to_string())
                .with_query(query);
        }

        let formatter = ResponseFormatter::new(self.format_mode, self.model.as_deref());
        let reply = match formatter.render(question, &result) {
            Ok(text) if row_count == 0 => self.reply(ReplyKind::NoRecords, &text),
            Ok(text) => self.reply(ReplyKind::Answer, &text),
            Err(error) => {
                tracing::warn!(code = error.code(), %error, "formatting failed");
                self.reply(ReplyKind::FormatFailed, FORMAT_FAILED_MESSAGE)
                    .with_detail(error.to_string())
            }
        };
        reply.with_query(query).with_row_count(row_count)
    }

    /// Primary first unless the policy says otherwise; at most one fallback attempt.
    fn select_query(&self, question: &Question) -> Selection {
        let primary_error = if self.policy == FallbackPolicy::FallbackOnly {
            if is_greeting(question) {
                tracing::info!("greeting short-circuit");
                return Selection::Greeting;
            }
            PipelineError::GenerationFailure("primary synthesis disabled by policy".to_string())
        } else {
            let synthesizer = PrimarySynthesizer::new(&self.schema, self.model.as_deref());
            match synthesizer.synthesize(question) {
                Synthesis::Greeting => {
                    tracing::info!("greeting short-circuit");
                    return Selection::Greeting;
                }
                Synthesis::Candidate(candidate) => match validate(candidate) {
                    Ok(validated) => return Selection::Query(validated),
                    Err(rejection) => {
                        tracing::warn!(
                            reason = rejection.reason.as_key(),
                            detected = rejection.detected.as_deref().unwrap_or_default(),
                            "primary candidate rejected"
                        );
                        PipelineError::ValidationRejection(rejection.to_string())
                    }
                },
                Synthesis::Failed(error) => error,
            }
        };

        if self.policy == FallbackPolicy::PrimaryOnly {
            return Selection::Unanswerable(primary_error);
        }

        tracing::info!(cause = %primary_error, "trying fallback synthesis");
        let Some(candidate) = fallback(question) else {
            return Selection::Unanswerable(PipelineError::GenerationFailure(format!(
                "{primary_error}; no fallback rule matched"
            )));
        };
        match validate(candidate) {
            Ok(validated) => Selection::Query(validated),
            Err(rejection) => {
                tracing::error!(%rejection, "fallback candidate rejected");
                Selection::Unanswerable(PipelineError::ValidationRejection(rejection.to_string()))
            }
        }
    }

    fn reply(&self, kind: ReplyKind, text: &str) -> Reply {
        Reply::new(kind, chunk_message(text, self.max_message_len))
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("schema", &self.schema.version)
            .field("model", &self.model.as_ref().map(|model| model.name().to_string()))
            .field("executor", &self.executor)
            .field("format_mode", &self.format_mode)
            .field("policy", &self.policy)
            .field("max_message_len", &self.max_message_len)
            .finish()
    }
}
