// crates/cli/src/main.rs
//! `arena-log` binary: decode a client log file (or stdin) to JSON Lines.

use std::fs::File;
use std::io::{self, BufWriter};

use anyhow::{Context, Result};
use arena_log_cli::{run, Config};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,arena_log_decoder=info,arena_log_cli=info".into()),
        )
        .init();

    let config = Config::parse();
    let output = BufWriter::new(io::stdout().lock());

    if config.reads_stdin() {
        run(&config, io::stdin().lock(), output)?;
    } else {
        let file = File::open(&config.path)
            .with_context(|| format!("opening log file {}", config.path.display()))?;
        run(&config, file, output)?;
    }
    Ok(())
}
