// crates/decoder/src/entry.rs
//! The decoded log entry handed to sinks.

use std::borrow::Cow;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;
use sha1::{Digest, Sha1};

use crate::error::PayloadError;
use crate::patterns::{EntryKind, LabelCaptures};

/// One fully decoded label + JSON payload.
///
/// Every field is an owned copy; nothing borrows from the decoder's buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub kind: EntryKind,
    pub timestamp: Option<String>,
    pub player_id: Option<String>,
    pub label: Option<String>,
    pub arrow: Option<String>,
    /// Hex SHA-1 of the payload text followed by the decimal stream position.
    pub hash: String,
    /// Absolute byte offset of the label in the stream.
    pub position: u64,
    /// Stream bytes consumed by this entry: label, payload and line terminator.
    pub source_len: usize,
    payload: String,
}

/// Content fingerprint used for downstream deduplication.
///
/// The position is part of the digest so identical payloads at different
/// points of the log stay distinguishable, while replaying the same stream
/// reproduces the same hashes. SHA-1 keeps the values identical to the
/// fingerprints other consumers of this log already store.
pub fn fingerprint(json_text: &str, position: u64) -> String {
    let mut hasher = Sha1::new();
    hasher.update(json_text.as_bytes());
    hasher.update(position.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

impl LogEntry {
    pub(crate) fn new(
        captures: LabelCaptures,
        payload: String,
        position: u64,
        source_len: usize,
    ) -> Self {
        let hash = fingerprint(&payload, position);
        Self {
            kind: captures.kind(),
            timestamp: captures.timestamp,
            player_id: captures.player_id,
            label: captures.label,
            arrow: captures.arrow,
            hash,
            position,
            source_len,
            payload,
        }
    }

    /// Raw JSON text. Only plain `label_json` entries expose it.
    pub fn text(&self) -> Option<&str> {
        match self.kind {
            EntryKind::LabelJson => Some(&self.payload),
            EntryKind::LabelArrowJson => None,
        }
    }

    /// Parse the payload, unwrapping one envelope layer.
    ///
    /// A truthy `payload` member is returned as is. Otherwise a truthy
    /// `request` member is parsed as JSON and returned when the result is
    /// truthy; a non-string `request` is first coerced to text the way the
    /// producer does, so an object `request` is an error. Anything else
    /// yields the whole parsed value.
    ///
    /// Parsing happens on every call; failures are logged and returned, never
    /// panicked on.
    pub fn json(&self) -> Result<Value, PayloadError> {
        let result = parse_payload(&self.payload, self.position);
        if let Err(err) = &result {
            tracing::warn!(
                position = self.position,
                label = self.label.as_deref().unwrap_or_default(),
                error = %err,
                "Failed to parse log entry payload"
            );
        }
        result
    }
}

fn parse_payload(payload: &str, position: u64) -> Result<Value, PayloadError> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|source| PayloadError::MalformedJson { position, source })?;

    if let Some(inner) = value.get("payload").filter(|v| is_truthy(v)) {
        return Ok(inner.clone());
    }

    if let Some(request) = value.get("request").filter(|v| is_truthy(v)) {
        let inner: Value = serde_json::from_str(&request_text(request))
            .map_err(|source| PayloadError::MalformedRequest { position, source })?;
        if is_truthy(&inner) {
            return Ok(inner);
        }
    }

    Ok(value)
}

/// The string the producer parses for a `request` member. Non-string values
/// go through its string coercion, so an object becomes `[object Object]` and
/// fails to parse.
fn request_text(request: &Value) -> Cow<'_, str> {
    match request {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Null => Cow::Borrowed(""),
        Value::Bool(b) => Cow::Owned(b.to_string()),
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::Array(items) => Cow::Owned(
            items
                .iter()
                .map(|item| request_text(item).into_owned())
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Cow::Borrowed("[object Object]"),
    }
}

/// Truthiness as the log's producer treats it: `null`, `false`, zero and the
/// empty string are falsy; every array and object is truthy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl Serialize for LogEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("LogEntry", 10)?;
        state.serialize_field("type", &self.kind)?;
        if let Some(timestamp) = &self.timestamp {
            state.serialize_field("timestamp", timestamp)?;
        }
        if let Some(player_id) = &self.player_id {
            state.serialize_field("playerId", player_id)?;
        }
        if let Some(label) = &self.label {
            state.serialize_field("label", label)?;
        }
        if let Some(arrow) = &self.arrow {
            state.serialize_field("arrow", arrow)?;
        }
        state.serialize_field("hash", &self.hash)?;
        if let Some(text) = self.text() {
            state.serialize_field("text", text)?;
        }
        state.serialize_field("position", &self.position)?;
        state.end()
    }
}
