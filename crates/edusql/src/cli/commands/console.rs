use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use clap::Args;

use crate::config::AppConfig;
use crate::pipeline::Pipeline;

use super::build_pipeline;

const PROMPT: &str = "edusql> ";

#[derive(Debug, Clone, Args)]
pub struct ConsoleArgs {
    /// Render rows with the built-in templates instead of the model.
    #[arg(long, default_value_t = false)]
    pub template: bool,
}

pub fn run(config: &AppConfig) -> Result<()> {
    let pipeline = build_pipeline(config)?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let answered = run_console(&pipeline, stdin.lock(), stdout.lock())?;
    tracing::info!(answered, "console session ended");
    Ok(())
}

/// Answers one line at a time until `exit`, `quit` or end of input. Returns how
/// many questions were answered.
pub fn run_console<R: BufRead, W: Write>(
    pipeline: &Pipeline,
    input: R,
    mut output: W,
) -> Result<usize> {
    writeln!(output, "Ask about students, classes, fees or exams. Type `exit` to quit.")
        .context("failed to write console banner")?;

    let mut answered = 0;
    let mut lines = input.lines();
    loop {
        write!(output, "{PROMPT}").context("failed to write console prompt")?;
        output.flush().context("failed to flush console prompt")?;

        let Some(line) = lines.next() else {
            writeln!(output).context("failed to write console output")?;
            break;
        };
        let line = line.context("failed to read console input")?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            break;
        }

        let reply = pipeline.answer(trimmed);
        for chunk in &reply.chunks {
            writeln!(output, "{chunk}").context("failed to write console reply")?;
        }
        answered += 1;
    }

    Ok(answered)
}
