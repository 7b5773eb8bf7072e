use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::commands::{
    ask::AskArgs, chat::ChatArgs, console::ConsoleArgs, init_db::InitDbArgs, schema::SchemaArgs,
};
use crate::config::{
    DEFAULT_MAX_MESSAGE_LEN, DEFAULT_MODEL_NAME, DEFAULT_MODEL_TIMEOUT_SECS,
    DEFAULT_QUERY_TIMEOUT_SECS, FallbackPolicy,
};
use crate::llm::DEFAULT_GEMINI_ENDPOINT;

#[derive(Debug, Parser)]
#[command(
    name = "edusql",
    version,
    about = "Natural-language questions over the school database"
)]
pub struct Cli {
    #[command(flatten)]
    pub runtime: RuntimeArgs,

    #[command(flatten)]
    pub model: ModelArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct RuntimeArgs {
    #[arg(long, global = true, value_name = "PATH")]
    pub home_dir: Option<PathBuf>,

    #[arg(long, global = true, value_name = "PATH")]
    pub cwd: Option<PathBuf>,

    /// SQLite database file; defaults to ~/.edusql/school.sqlite.
    #[arg(long, global = true, value_name = "PATH", env = "EDUSQL_DB")]
    pub db: Option<PathBuf>,

    /// Tracing filter used when RUST_LOG is unset.
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ModelArgs {
    #[arg(
        long,
        global = true,
        value_name = "KEY",
        env = "GEMINI_API_KEY",
        hide_env_values = true
    )]
    pub api_key: Option<String>,

    #[arg(
        long = "model",
        global = true,
        value_name = "NAME",
        env = "EDUSQL_MODEL",
        default_value = DEFAULT_MODEL_NAME
    )]
    pub model_name: String,

    #[arg(long, global = true, value_name = "URL", default_value = DEFAULT_GEMINI_ENDPOINT)]
    pub model_endpoint: String,

    #[arg(long, global = true, value_name = "SECS", default_value_t = DEFAULT_MODEL_TIMEOUT_SECS)]
    pub model_timeout_secs: u64,

    #[arg(long, global = true, value_name = "SECS", default_value_t = DEFAULT_QUERY_TIMEOUT_SECS)]
    pub query_timeout_secs: u64,

    #[arg(long, global = true, value_name = "CHARS", default_value_t = DEFAULT_MAX_MESSAGE_LEN)]
    pub max_message_len: usize,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = FallbackPolicy::PrimaryThenFallback
    )]
    pub fallback_policy: FallbackPolicy,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Answer one question and exit.
    Ask(AskArgs),
    /// Interactive question loop on stdin.
    Console(ConsoleArgs),
    /// JSON-lines chat relay on stdin/stdout.
    Chat(ChatArgs),
    /// Print the schema descriptor or the chat wire schema.
    Schema(SchemaArgs),
    /// Create the school tables, optionally with demo rows.
    InitDb(InitDbArgs),
}

impl Command {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ask(_) => "ask",
            Self::Console(_) => "console",
            Self::Chat(_) => "chat",
            Self::Schema(_) => "schema",
            Self::InitDb(_) => "init-db",
        }
    }

    /// Commands whose stdout must parse as JSON keep progress lines on stderr.
    #[must_use]
    pub const fn writes_json_to_stdout(&self) -> bool {
        match self {
            Self::Ask(args) => args.json,
            Self::Chat(_) => true,
            Self::Schema(args) => args.json || args.wire,
            Self::Console(_) | Self::InitDb(_) => false,
        }
    }
}
