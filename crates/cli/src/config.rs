// crates/cli/src/config.rs
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use arena_log_decoder::DecoderOptions;
use clap::Parser;

/// Decode a game client log into one JSON object per entry.
#[derive(Debug, Clone, Parser)]
#[command(name = "arena-log", version)]
pub struct Config {
    /// Log file to decode; `-` reads stdin.
    #[arg(default_value = "-")]
    pub path: PathBuf,

    /// Bytes read per append.
    #[arg(long, env = "ARENA_LOG_CHUNK_SIZE", default_value = "65536")]
    pub chunk_size: NonZeroUsize,

    /// Cap on text the decoder retains between appends.
    #[arg(long, env = "ARENA_LOG_MAX_RETAINED")]
    pub max_retained: Option<usize>,

    /// Include the parsed payload in each output line.
    #[arg(long)]
    pub payload: bool,

    /// Only output entries with this label.
    #[arg(long)]
    pub label: Option<String>,
}

impl Config {
    pub fn reads_stdin(&self) -> bool {
        self.path == Path::new("-")
    }

    pub fn decoder_options(&self) -> DecoderOptions {
        DecoderOptions {
            max_retained_bytes: self.max_retained,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["arena-log"]).unwrap();
        assert!(config.reads_stdin());
        assert!(!config.payload);
        assert_eq!(config.label, None);
        assert_eq!(config.decoder_options(), DecoderOptions::default());
    }

    #[test]
    fn test_flags() {
        let config = Config::try_parse_from([
            "arena-log",
            "Player.log",
            "--chunk-size",
            "128",
            "--max-retained",
            "4096",
            "--payload",
            "--label",
            "Inventory.Updated",
        ])
        .unwrap();
        assert!(!config.reads_stdin());
        assert_eq!(config.path, PathBuf::from("Player.log"));
        assert_eq!(config.chunk_size.get(), 128);
        assert_eq!(config.decoder_options().max_retained_bytes, Some(4096));
        assert!(config.payload);
        assert_eq!(config.label.as_deref(), Some("Inventory.Updated"));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        assert!(Config::try_parse_from(["arena-log", "--chunk-size", "0"]).is_err());
    }
}
