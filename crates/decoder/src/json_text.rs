// crates/decoder/src/json_text.rs
//! Bracket- and string-aware scanning of JSON values embedded in log text.
//!
//! The scanner never parses and never allocates beyond a small closer stack.
//! It only finds where a value ends, so the caller can tell a payload that is
//! still arriving from one that will never be valid.

use memchr::memchr2;

/// Outcome of measuring a JSON value at a buffer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonExtent {
    /// The value is complete and spans this many bytes.
    Complete(usize),
    /// The buffer ends before the value does.
    Incomplete,
    /// No amount of further input can turn this into a valid value.
    Malformed,
}

/// Whether the byte at `pos` can open a JSON value.
///
/// A `false` here is final: nothing appended later changes the byte at `pos`.
pub fn looks_like_json_start(buffer: &str, pos: usize) -> bool {
    matches!(
        buffer.as_bytes().get(pos),
        Some(b'{' | b'[' | b'"' | b'0'..=b'9' | b'-' | b't' | b'f' | b'n')
    )
}

/// Length in bytes of the JSON value starting at `pos`.
///
/// Objects and arrays are measured by tracking nesting and string/escape
/// state, so pretty-printed payloads and brackets inside string literals are
/// handled. A number that runs up to the end of the buffer is reported as
/// [`JsonExtent::Incomplete`] because more digits may still arrive.
pub fn json_value_length(buffer: &str, pos: usize) -> JsonExtent {
    let bytes = buffer.as_bytes();
    let Some(rest) = bytes.get(pos..).filter(|rest| !rest.is_empty()) else {
        return JsonExtent::Incomplete;
    };
    match rest[0] {
        b'{' | b'[' => structure_length(rest),
        b'"' => string_length(rest),
        b'-' | b'0'..=b'9' => number_length(rest),
        b't' => literal_length(rest, b"true"),
        b'f' => literal_length(rest, b"false"),
        b'n' => literal_length(rest, b"null"),
        _ => JsonExtent::Malformed,
    }
}

fn structure_length(bytes: &[u8]) -> JsonExtent {
    let mut closers: Vec<u8> = Vec::with_capacity(8);
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => match string_length(&bytes[i..]) {
                JsonExtent::Complete(n) => {
                    i += n;
                    continue;
                }
                other => return other,
            },
            b'{' => closers.push(b'}'),
            b'[' => closers.push(b']'),
            closer @ (b'}' | b']') => {
                if closers.pop() != Some(closer) {
                    return JsonExtent::Malformed;
                }
                if closers.is_empty() {
                    return JsonExtent::Complete(i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }
    JsonExtent::Incomplete
}

/// `bytes[0]` is the opening quote.
fn string_length(bytes: &[u8]) -> JsonExtent {
    let mut i = 1;
    while i < bytes.len() {
        let Some(offset) = memchr2(b'"', b'\\', &bytes[i..]) else {
            break;
        };
        let at = i + offset;
        if bytes[at] == b'"' {
            return JsonExtent::Complete(at + 1);
        }
        // Backslash: the next byte is escaped, whatever it is.
        i = at + 2;
    }
    JsonExtent::Incomplete
}

fn number_length(bytes: &[u8]) -> JsonExtent {
    let len = bytes
        .iter()
        .position(|b| !matches!(b, b'0'..=b'9' | b'+' | b'-' | b'.' | b'e' | b'E'))
        .unwrap_or(bytes.len());
    if len == bytes.len() {
        return JsonExtent::Incomplete;
    }
    if bytes[0] == b'-' && !bytes[1].is_ascii_digit() {
        return JsonExtent::Malformed;
    }
    JsonExtent::Complete(len)
}

fn literal_length(bytes: &[u8], literal: &[u8]) -> JsonExtent {
    let n = bytes.len().min(literal.len());
    if bytes[..n] != literal[..n] {
        JsonExtent::Malformed
    } else if n < literal.len() {
        JsonExtent::Incomplete
    } else {
        JsonExtent::Complete(literal.len())
    }
}
