// crates/decoder/src/parser.rs
//! Classification of one label match against the buffered text.

use crate::entry::LogEntry;
use crate::error::DecodeError;
use crate::json_text::{json_value_length, looks_like_json_start, JsonExtent};
use crate::patterns::rematch;

/// Result of resolving one candidate label against the available text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A complete entry spanning `consumed` bytes from the label start.
    Full { consumed: usize, entry: LogEntry },
    /// More input is needed before this label can be resolved.
    Partial,
    /// The label has no usable payload; skip `consumed` bytes (the label only).
    Invalid { consumed: usize },
}

/// Resolve the label `matched_text` found at `match_index` in `buffer`.
///
/// `position` is the absolute stream offset of `match_index`; it is bound
/// into the entry's hash. Returns an error only when `matched_text` is not
/// recognised by any entry pattern, which means the search expression and
/// the pattern table disagree.
pub fn classify(
    buffer: &str,
    matched_text: &str,
    match_index: usize,
    position: u64,
) -> Result<Classification, DecodeError> {
    let captures =
        rematch(matched_text).ok_or_else(|| DecodeError::unrecognized(position, matched_text))?;

    let label_len = matched_text.len();
    let json_start = match_index + label_len;
    let rest = buffer.get(json_start..).unwrap_or_default();

    // A lone trailing '\r' is the first half of a line break still in flight.
    if rest.is_empty() || rest == "\r" {
        return Ok(Classification::Partial);
    }
    if !looks_like_json_start(buffer, json_start) {
        return Ok(Classification::Invalid {
            consumed: label_len,
        });
    }

    let json_len = match json_value_length(buffer, json_start) {
        JsonExtent::Complete(len) => len,
        JsonExtent::Incomplete => return Ok(Classification::Partial),
        JsonExtent::Malformed => {
            return Ok(Classification::Invalid {
                consumed: label_len,
            })
        }
    };

    let json_end = json_start + json_len;
    let after = &buffer[json_end..];
    let terminator_len = if after.starts_with("\r\n") {
        2
    } else if after.starts_with('\n') {
        1
    } else if after.is_empty() || after == "\r" {
        return Ok(Classification::Partial);
    } else {
        // Text after the value on the same line: no later input can fix it.
        return Ok(Classification::Invalid {
            consumed: label_len,
        });
    };

    let consumed = label_len + json_len + terminator_len;
    let payload = buffer[json_start..json_end].to_string();
    let entry = LogEntry::new(captures, payload, position, consumed);
    Ok(Classification::Full { consumed, entry })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{search_regex, EntryKind};

    fn classify_first(buffer: &str, base: u64) -> Classification {
        let m = search_regex().find(buffer).expect("label in test buffer");
        classify(buffer, m.as_str(), m.start(), base + m.start() as u64).unwrap()
    }

    #[test]
    fn test_full_same_line_payload() {
        let buf = "[UnityCrossThreadLogger]12:00:00: hello: world{\"a\":1}\r\n";
        let Classification::Full { consumed, entry } = classify_first(buf, 0) else {
            panic!("expected full");
        };
        assert_eq!(consumed, buf.len());
        assert_eq!(entry.kind, EntryKind::LabelJson);
        assert_eq!(entry.text(), Some("{\"a\":1}"));
        assert_eq!(entry.label.as_deref(), Some("world"));
        assert_eq!(entry.player_id.as_deref(), Some("hello"));
        assert_eq!(entry.timestamp.as_deref(), Some("12:00:00"));
        assert_eq!(entry.position, 0);
        assert_eq!(entry.source_len, buf.len());
    }

    #[test]
    fn test_full_next_line_payload() {
        let buf = "noise\n[UnityCrossThreadLogger]1:00 PM: Match to P1: Inventory.Updated\n{\"gems\":5}\ntail";
        let Classification::Full { consumed, entry } = classify_first(buf, 1000) else {
            panic!("expected full");
        };
        let label_start = 6;
        assert_eq!(entry.position, 1000 + label_start);
        assert_eq!(&buf[label_start as usize + consumed..], "tail");
        assert_eq!(entry.label.as_deref(), Some("Inventory.Updated"));
        assert_eq!(entry.json().unwrap()["gems"], 5);
    }

    #[test]
    fn test_full_arrow() {
        let buf = "[UnityCrossThreadLogger]==> Event.Join {\"id\":1,\"request\":\"{\\\"x\\\":2}\"}\n";
        let Classification::Full { consumed, entry } = classify_first(buf, 0) else {
            panic!("expected full");
        };
        assert_eq!(consumed, buf.len());
        assert_eq!(entry.kind, EntryKind::LabelArrowJson);
        assert_eq!(entry.arrow.as_deref(), Some("==>"));
        assert_eq!(entry.label.as_deref(), Some("Event.Join"));
        assert_eq!(entry.text(), None);
        assert_eq!(entry.json().unwrap()["x"], 2);
    }

    #[test]
    fn test_partial_when_payload_not_started() {
        let buf = "[UnityCrossThreadLogger]==> Event.Join ";
        assert_eq!(classify_first(buf, 0), Classification::Partial);
        let buf = "[UnityCrossThreadLogger]12:00:00: p: Label\r\n";
        assert_eq!(classify_first(buf, 0), Classification::Partial);
    }

    #[test]
    fn test_partial_on_split_line_break_after_label() {
        let buf = "[UnityCrossThreadLogger]12:00:00: p: Label\r";
        assert_eq!(classify_first(buf, 0), Classification::Partial);
    }

    #[test]
    fn test_partial_when_payload_truncated() {
        let buf = "[UnityCrossThreadLogger]12:00:00: hello: world{\"a\"";
        assert_eq!(classify_first(buf, 0), Classification::Partial);
    }

    #[test]
    fn test_partial_when_terminator_missing() {
        let buf = "[UnityCrossThreadLogger]12:00:00: hello: world{\"a\":1}";
        assert_eq!(classify_first(buf, 0), Classification::Partial);
        let buf = "[UnityCrossThreadLogger]12:00:00: hello: world{\"a\":1}\r";
        assert_eq!(classify_first(buf, 0), Classification::Partial);
    }

    #[test]
    fn test_invalid_skips_label_only() {
        let label = "[UnityCrossThreadLogger]==> Client.Disconnect ";
        let buf = format!("{label}goodbye\r\n");
        assert_eq!(
            classify_first(&buf, 0),
            Classification::Invalid {
                consumed: label.len()
            }
        );
    }

    #[test]
    fn test_invalid_on_malformed_literal() {
        let label = "[UnityCrossThreadLogger]==> Ping ";
        let buf = format!("{label}nothing\r\n");
        assert_eq!(
            classify_first(&buf, 0),
            Classification::Invalid {
                consumed: label.len()
            }
        );
    }

    #[test]
    fn test_invalid_on_trailing_text_after_payload() {
        let label = "[UnityCrossThreadLogger]12:00:00: hello: world";
        let buf = format!("{label}{{\"a\":1}} x\r\n");
        assert_eq!(
            classify_first(&buf, 0),
            Classification::Invalid {
                consumed: label.len()
            }
        );
        let label = "[UnityCrossThreadLogger]1:00 PM: Match to P1: Deck.Count ";
        let buf = format!("{label}[3] decks loaded\r\n");
        assert_eq!(
            classify_first(&buf, 0),
            Classification::Invalid {
                consumed: label.len()
            }
        );
    }

    #[test]
    fn test_unrecognized_label_is_error() {
        let err = classify("garbage", "garbage", 0, 5).unwrap_err();
        assert!(matches!(err, DecodeError::UnrecognizedLabel { position: 5, .. }));
    }
}
