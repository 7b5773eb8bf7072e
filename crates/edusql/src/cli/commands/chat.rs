use std::io::{BufRead, Write};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result, anyhow, bail};
use clap::Args;
use serde::Serialize;

use crate::config::AppConfig;
use crate::models::{InboundMessage, OutboundMessage, RelayError};
use crate::pipeline::Pipeline;

use super::build_pipeline;

const DEFAULT_WORKERS: usize = 4;

#[derive(Debug, Clone, Args)]
pub struct ChatArgs {
    /// Messages answered concurrently.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelaySummary {
    pub messages: usize,
    pub malformed: usize,
    pub chunks: usize,
}

pub fn run(args: &ChatArgs, config: &AppConfig) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    let stdin = std::io::stdin();
    let summary = run_relay(&pipeline, stdin.lock(), std::io::stdout(), args.workers)?;
    tracing::info!(
        messages = summary.messages,
        malformed = summary.malformed,
        chunks = summary.chunks,
        "chat relay finished"
    );
    Ok(())
}

/// Reads one inbound JSON object per line and answers each on the worker pool.
/// All chunks of one reply are written together, in order; replies to different
/// messages may interleave in any order.
pub fn run_relay<R, W>(
    pipeline: &Pipeline,
    input: R,
    output: W,
    workers: usize,
) -> Result<RelaySummary>
where
    R: BufRead,
    W: Write + Send,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|index| format!("edusql-chat-{index}"))
        .build()
        .context("failed to start chat worker pool")?;

    let output = Mutex::new(output);
    let messages = AtomicUsize::new(0);
    let malformed = AtomicUsize::new(0);
    let chunks = AtomicUsize::new(0);
    let write_failures = AtomicUsize::new(0);

    let read_result = pool.in_place_scope(|scope| -> Result<()> {
        for (index, line) in input.lines().enumerate() {
            let line = line.context("failed to read chat input")?;
            let line_number = index + 1;
            if line.trim().is_empty() {
                continue;
            }

            let inbound = match serde_json::from_str::<InboundMessage>(&line) {
                Ok(inbound) => inbound,
                Err(error) => {
                    tracing::warn!(line = line_number, %error, "malformed chat line");
                    malformed.fetch_add(1, Ordering::Relaxed);
                    let relay_error = RelayError {
                        line: line_number,
                        error: error.to_string(),
                    };
                    if let Err(error) = write_lines(&output, &[relay_error]) {
                        tracing::error!(%error, "failed to write relay error");
                        write_failures.fetch_add(1, Ordering::Relaxed);
                    }
                    continue;
                }
            };

            messages.fetch_add(1, Ordering::Relaxed);
            let (output, chunks, write_failures) = (&output, &chunks, &write_failures);
            scope.spawn(move |_| {
                let reply = pipeline.answer(&inbound.text);
                let outbound = reply
                    .chunks
                    .into_iter()
                    .enumerate()
                    .map(|(seq, text)| OutboundMessage {
                        chat_id: inbound.chat_id,
                        seq,
                        text,
                    })
                    .collect::<Vec<_>>();
                chunks.fetch_add(outbound.len(), Ordering::Relaxed);
                if let Err(error) = write_lines(output, &outbound) {
                    tracing::error!(chat_id = inbound.chat_id, %error, "failed to write reply");
                    write_failures.fetch_add(1, Ordering::Relaxed);
                }
            });
        }
        Ok(())
    });
    read_result?;

    let failures = write_failures.load(Ordering::Relaxed);
    if failures > 0 {
        bail!("chat relay failed to write {failures} line group(s)");
    }

    Ok(RelaySummary {
        messages: messages.load(Ordering::Relaxed),
        malformed: malformed.load(Ordering::Relaxed),
        chunks: chunks.load(Ordering::Relaxed),
    })
}

fn write_lines<W: Write, T: Serialize>(output: &Mutex<W>, lines: &[T]) -> Result<()> {
    let mut encoded = String::new();
    for line in lines {
        encoded.push_str(&serde_json::to_string(line).context("failed to encode chat line")?);
        encoded.push('\n');
    }

    let mut output = output
        .lock()
        .map_err(|_| anyhow!("chat output lock poisoned"))?;
    output
        .write_all(encoded.as_bytes())
        .context("failed to write chat output")?;
    output.flush().context("failed to flush chat output")
}
