// crates/decoder/src/lib.rs
//! Incremental decoder for the game client's diagnostic log.
//!
//! Feed raw text chunks to a [`LogDecoder`]; it emits one [`LogEntry`] per
//! label + JSON payload, in stream order, regardless of where the chunk
//! boundaries fall.

pub mod decoder;
pub mod entry;
pub mod error;
pub mod json_text;
pub mod parser;
pub mod patterns;
pub mod search;

pub use decoder::{DecoderOptions, EntrySink, LogDecoder};
pub use entry::{fingerprint, LogEntry};
pub use error::{DecodeError, PayloadError};
pub use parser::{classify, Classification};
pub use patterns::{max_pattern_line_span, EntryKind, LabelCaptures, LabelPattern};
