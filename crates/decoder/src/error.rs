// crates/decoder/src/error.rs
use thiserror::Error;

/// Errors that stop the decoder.
///
/// Truncated and malformed log text are not errors; they are handled by the
/// classifier as `Partial` and `Invalid`. Only a broken pattern table ends up
/// here.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Label matched the search pattern but no entry pattern at position {position}: {text:?}")]
    UnrecognizedLabel { position: u64, text: String },
}

/// Errors that can occur when parsing an entry's embedded JSON payload
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Malformed JSON payload at position {position}: {source}")]
    MalformedJson {
        position: u64,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed JSON in request envelope at position {position}: {source}")]
    MalformedRequest {
        position: u64,
        #[source]
        source: serde_json::Error,
    },
}

impl DecodeError {
    pub fn unrecognized(position: u64, text: impl Into<String>) -> Self {
        Self::UnrecognizedLabel {
            position,
            text: text.into(),
        }
    }
}

impl PayloadError {
    pub fn position(&self) -> u64 {
        match self {
            Self::MalformedJson { position, .. } | Self::MalformedRequest { position, .. } => {
                *position
            }
        }
    }
}
