// crates/decoder/src/decoder.rs
//! Incremental decoder over a continuously appended log stream.
//!
//! Chunks arrive with arbitrary boundaries. The decoder keeps only the suffix
//! of the stream it has not yet consumed, finds label matches in it, and
//! hands completed entries to a sink in stream order. Everything before the
//! last resolved match is dropped after each call, so the retained buffer
//! stays small in the steady state.

use crate::entry::LogEntry;
use crate::error::DecodeError;
use crate::parser::{classify, Classification};
use crate::patterns::{max_pattern_line_span, search_regex};
use crate::search::nth_last_index_of;

/// Buffers larger than this are shrunk once most of their text is discarded.
const SHRINK_THRESHOLD: usize = 1 << 20;

/// Receiver of decoded entries.
///
/// Called synchronously on the decoder's stack, once per entry, in stream
/// order. Slow work (persistence, cross-process dispatch) should be handed
/// off rather than done inline.
pub trait EntrySink {
    fn on_entry(&mut self, entry: LogEntry);
}

impl<F: FnMut(LogEntry)> EntrySink for F {
    fn on_entry(&mut self, entry: LogEntry) {
        self(entry)
    }
}

/// Tuning for [`LogDecoder`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Hard cap on retained text after each append. When the fallback trim
    /// still leaves more than this, the oldest bytes are dropped. `None`
    /// leaves memory bounded by the line-based trim alone.
    pub max_retained_bytes: Option<usize>,
}

/// Turns appended text chunks into [`LogEntry`] values.
///
/// `append` takes `&mut self`: callers serialize chunk delivery, and a sink
/// cannot re-enter the decoder it is being fed from.
#[derive(Debug, Default)]
pub struct LogDecoder {
    buffer: String,
    discarded: u64,
    options: DecoderOptions,
}

impl LogDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DecoderOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Bytes currently held for future chunks.
    pub fn retained_len(&self) -> usize {
        self.buffer.len()
    }

    /// Total bytes dropped from the front of the stream so far.
    pub fn total_discarded(&self) -> u64 {
        self.discarded
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Append a chunk and emit every entry it completes.
    ///
    /// Returns the number of entries handed to `sink`. The only error is a
    /// label the entry patterns fail to recognise; after it the decoder
    /// should not be fed further.
    pub fn append(
        &mut self,
        chunk: &str,
        sink: &mut impl EntrySink,
    ) -> Result<usize, DecodeError> {
        self.buffer.push_str(chunk);

        let mut used = 0usize;
        let mut cursor = 0usize;
        let mut emitted = 0usize;

        while let Some(m) = search_regex().find_at(&self.buffer, cursor) {
            let position = self.discarded + m.start() as u64;
            match classify(&self.buffer, m.as_str(), m.start(), position)? {
                Classification::Invalid { consumed } => {
                    tracing::trace!(position, consumed, "Skipping label without payload");
                    used = m.start() + consumed;
                }
                Classification::Partial => {
                    tracing::trace!(position, "Label waiting for more input");
                    used = m.start();
                    break;
                }
                Classification::Full { consumed, entry } => {
                    tracing::trace!(
                        position,
                        consumed,
                        label = entry.label.as_deref().unwrap_or_default(),
                        "Decoded entry"
                    );
                    used = m.start() + consumed;
                    sink.on_entry(entry);
                    emitted += 1;
                }
            }
            cursor = used;
        }

        // Nothing resolved: keep only enough trailing lines for the longest
        // pattern to still match once the rest of it arrives.
        if used == 0 {
            if let Some(boundary) =
                nth_last_index_of(&self.buffer, b'\n', max_pattern_line_span())
            {
                tracing::debug!(
                    bytes = boundary,
                    retained = self.buffer.len() - boundary,
                    "Fallback trim of unmatched text"
                );
                used = boundary;
            }
        }

        self.discard(used);
        self.enforce_cap();
        Ok(emitted)
    }

    /// Decode a complete text in one call.
    pub fn decode_str(text: &str) -> Result<Vec<LogEntry>, DecodeError> {
        let mut entries = Vec::new();
        Self::new().append(text, &mut |entry: LogEntry| entries.push(entry))?;
        Ok(entries)
    }

    fn discard(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.buffer.drain(..len);
        self.discarded += len as u64;

        let capacity = self.buffer.capacity();
        if capacity > SHRINK_THRESHOLD && capacity > 4 * self.buffer.len() {
            self.buffer.shrink_to(self.buffer.len() * 2);
        }
    }

    fn enforce_cap(&mut self) {
        let Some(cap) = self.options.max_retained_bytes else {
            return;
        };
        if self.buffer.len() <= cap {
            return;
        }
        let mut cut = self.buffer.len() - cap;
        while !self.buffer.is_char_boundary(cut) {
            cut += 1;
        }
        tracing::warn!(
            dropped = cut,
            cap,
            position = self.discarded,
            "Retained log text exceeded cap; dropping oldest bytes"
        );
        self.discard(cut);
    }
}
