#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, anyhow};
use clap::Parser;
use clap::error::ErrorKind;
use edusql::cli::app::{Cli, Command};
use edusql::cli::commands;
use edusql::config::{AppConfig, ConfigInputs, ModelConfig, resolve_app_config};
use edusql::logging::init_logging;
use edusql::models::UnansweredQuestion;

const EXIT_SUCCESS: i32 = 0;
const EXIT_RUNTIME_FAILURE: i32 = 1;
const EXIT_UNANSWERED: i32 = 2;
const EXIT_USAGE_ERROR: i32 = 64;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => return exit_code_for_parse_error(error),
    };
    init_logging(cli.runtime.log_level.as_deref());

    let command_name = cli.command.name();
    let progress_on_stdout = !cli.command.writes_json_to_stdout();
    progress(progress_on_stdout, &format!("edusql: starting `{command_name}`"));

    match execute(cli) {
        Ok(()) => {
            progress(
                progress_on_stdout,
                &format!("edusql: completed `{command_name}` (exit_code={EXIT_SUCCESS})"),
            );
            EXIT_SUCCESS
        }
        Err(error) => {
            let exit_code = classify_runtime_error(&error);
            eprintln!("edusql: failed `{command_name}` (exit_code={exit_code})");
            eprintln!("{error:#}");
            exit_code
        }
    }
}

fn execute(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Schema(args) => commands::schema::run(args),
        Command::Ask(args) => commands::ask::run(args, &resolve_config(&cli)?),
        Command::Console(_) => commands::console::run(&resolve_config(&cli)?),
        Command::Chat(args) => commands::chat::run(args, &resolve_config(&cli)?),
        Command::InitDb(args) => commands::init_db::run(args, &resolve_config(&cli)?),
    }
}

fn classify_runtime_error(error: &anyhow::Error) -> i32 {
    if error.downcast_ref::<UnansweredQuestion>().is_some() {
        EXIT_UNANSWERED
    } else {
        EXIT_RUNTIME_FAILURE
    }
}

fn exit_code_for_parse_error(error: clap::Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = error.print();
            EXIT_SUCCESS
        }
        _ => {
            let _ = error.print();
            EXIT_USAGE_ERROR
        }
    }
}

fn progress(on_stdout: bool, line: &str) {
    if on_stdout {
        println!("{line}");
    } else {
        eprintln!("{line}");
    }
}

fn prefers_templates(command: &Command) -> bool {
    match command {
        Command::Ask(args) => args.template,
        Command::Console(args) => args.template,
        _ => false,
    }
}

fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let home_dir = match &cli.runtime.home_dir {
        Some(path) => path.clone(),
        None => std::env::var_os("HOME")
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("HOME is not set; pass --home-dir"))?,
    };

    let cwd = match &cli.runtime.cwd {
        Some(path) => path.clone(),
        None => std::env::current_dir()?,
    };

    let model = ModelConfig {
        api_key: cli.model.api_key.clone(),
        model_name: cli.model.model_name.clone(),
        endpoint: cli.model.model_endpoint.clone(),
        timeout: Duration::from_secs(cli.model.model_timeout_secs),
    };

    let config = resolve_app_config(ConfigInputs {
        home_dir: &home_dir,
        cwd: &cwd,
        database: cli.runtime.db.as_deref(),
        model,
        query_timeout_secs: cli.model.query_timeout_secs,
        max_message_len: cli.model.max_message_len,
        prefer_templates: prefers_templates(&cli.command),
        fallback_policy: cli.model.fallback_policy,
    })?;
    tracing::debug!(
        database = %config.database_path.display(),
        format_mode = ?config.format_mode,
        fallback_policy = ?config.fallback_policy,
        "configuration resolved"
    );
    Ok(config)
}
