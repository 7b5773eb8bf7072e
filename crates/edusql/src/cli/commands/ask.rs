use anyhow::{Context, Result, bail};
use clap::Args;
use serde_json::json;

use crate::config::AppConfig;
use crate::models::{AskEnvelope, Reply, ReplyKind, UnansweredQuestion};

use super::build_pipeline;

#[derive(Debug, Clone, Args)]
pub struct AskArgs {
    /// Question words; joined with single spaces.
    #[arg(value_name = "QUESTION", required = true, num_args = 1..)]
    pub question: Vec<String>,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Render rows with the built-in templates instead of the model.
    #[arg(long, default_value_t = false)]
    pub template: bool,
}

pub fn run(args: &AskArgs, config: &AppConfig) -> Result<()> {
    let question = args.question.join(" ");
    let pipeline = build_pipeline(config)?;

    let reply = pipeline.answer(&question);
    if args.json {
        let envelope = AskEnvelope::from_reply(&question, &reply)
            .with_meta("model_configured", json!(pipeline.has_model()))
            .with_meta("database_path", json!(config.database_path.display().to_string()));
        let encoded =
            serde_json::to_string_pretty(&envelope).context("failed to encode ask envelope")?;
        println!("{encoded}");
    } else {
        for chunk in &reply.chunks {
            println!("{chunk}");
        }
    }

    outcome(reply)
}

fn outcome(reply: Reply) -> Result<()> {
    let detail = reply.detail.unwrap_or_default();
    match reply.kind {
        ReplyKind::NotUnderstood => Err(UnansweredQuestion {
            kind: reply.kind,
            detail,
        }
        .into()),
        ReplyKind::FetchFailed | ReplyKind::FormatFailed => {
            bail!("{} ({detail})", reply.kind.as_key())
        }
        _ => Ok(()),
    }
}
