// crates/cli/src/lib.rs
//! Batch decoding of a game client log into JSON Lines.

pub mod chunks;
pub mod config;

use std::io::{Read, Write};
use std::time::Instant;

use anyhow::{Context, Result};
use arena_log_decoder::{LogDecoder, LogEntry};
use serde_json::Value;

pub use config::Config;

use crate::chunks::TextChunks;

/// Counters reported after a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub bytes_read: u64,
    pub entries: usize,
    pub written: usize,
    pub payload_errors: usize,
}

/// Decode everything `input` yields and write one JSON object per entry.
pub fn run(config: &Config, input: impl Read, mut output: impl Write) -> Result<RunSummary> {
    let started = Instant::now();
    let mut decoder = LogDecoder::with_options(config.decoder_options());
    let mut chunks = TextChunks::new(input, config.chunk_size.get());
    let mut summary = RunSummary::default();
    let mut batch = Vec::new();

    while let Some(chunk) = chunks.next_chunk().context("reading log input")? {
        decoder
            .append(&chunk, &mut |entry: LogEntry| batch.push(entry))
            .context("decoding log chunk")?;
        for entry in batch.drain(..) {
            summary.entries += 1;
            if config
                .label
                .as_deref()
                .is_some_and(|wanted| entry.label.as_deref() != Some(wanted))
            {
                continue;
            }
            let line = render(&entry, config.payload, &mut summary)?;
            serde_json::to_writer(&mut output, &line).context("writing entry")?;
            output.write_all(b"\n").context("writing entry")?;
            summary.written += 1;
        }
    }
    output.flush().context("flushing output")?;

    summary.bytes_read = chunks.bytes_read();
    tracing::info!(
        bytes = summary.bytes_read,
        entries = summary.entries,
        written = summary.written,
        payload_errors = summary.payload_errors,
        retained = decoder.retained_len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Decoded log"
    );
    Ok(summary)
}

fn render(entry: &LogEntry, with_payload: bool, summary: &mut RunSummary) -> Result<Value> {
    let mut line = serde_json::to_value(entry).context("serializing entry")?;
    if with_payload {
        match entry.json() {
            Ok(payload) => {
                if let Value::Object(map) = &mut line {
                    map.insert("payload".to_string(), payload);
                }
            }
            // Already logged by `json()`; the entry is still written.
            Err(_) => summary.payload_errors += 1,
        }
    }
    Ok(line)
}
