//! Pointer events sent by the browser extension.
//!
//! Wire schema (one JSON object per event):
//!
//! ```text
//! {"type": "move" | "click" | "rightclick" | "scroll", "dx"?: number, "dy"?: number}
//! ```
//!
//! The socket relay receives this object at the top level.  The stdio host
//! receives it nested under an `"event"` key, alongside whatever routing
//! fields the extension adds (e.g. `{"type": "MOUSE_EVENT", "event": {...}}`).
//!
//! # Lenient fields
//!
//! Decoding is strict about the envelope and lenient about the fields:
//!
//! - a payload that is not a JSON object is a [`DecodeError`];
//! - an unknown, missing, or non-string `type` decodes to [`EventKind::Other`],
//!   which the dispatcher ignores;
//! - a missing or non-numeric `dx` / `dy` decodes to `0.0`.
//!
//! All defaulting happens here, once, so the dispatcher only ever sees a fully
//! typed [`Event`].

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while decoding an event payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload is not valid UTF-8 JSON.
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload is valid JSON but not an object.
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// The action an event asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventKind {
    /// Relative pointer movement by `(dx, dy)` pixels.
    Move,
    /// Left button click.
    Click,
    /// Right button click.
    RightClick,
    /// Wheel scroll by `(dx, dy)` touch pixels.
    Scroll,
    /// Anything else, including an absent or `null` type.  Never an error.
    #[default]
    Other,
}

impl EventKind {
    /// Maps a JSON `type` value to an event kind.
    pub fn from_json(value: &Value) -> Self {
        match value.as_str() {
            Some("move") => Self::Move,
            Some("click") => Self::Click,
            Some("rightclick") => Self::RightClick,
            Some("scroll") => Self::Scroll,
            _ => Self::Other,
        }
    }

    /// Returns the wire name, or `"other"` for unrecognised kinds.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Click => "click",
            Self::RightClick => "rightclick",
            Self::Scroll => "scroll",
            Self::Other => "other",
        }
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_json(&value))
    }
}

/// One decoded pointer event.
///
/// Constructed fresh from a single message and discarded after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Event {
    #[serde(rename = "type", default)]
    pub kind: EventKind,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub dx: f64,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub dy: f64,
}

impl Event {
    /// Builds an event directly (tests and benchmarks).
    pub fn new(kind: EventKind, dx: f64, dy: f64) -> Self {
        Self { kind, dx, dy }
    }

    /// Decodes a top-level event object.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if `bytes` is not a JSON object.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mouse_relay_core::{Event, EventKind};
    ///
    /// let event = Event::from_slice(br#"{"type":"move","dx":4}"#).unwrap();
    /// assert_eq!(event.kind, EventKind::Move);
    /// assert_eq!((event.dx, event.dy), (4.0, 0.0));
    /// ```
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::from_object(parse_object(bytes)?)
    }

    /// Decodes an event nested under the `"event"` key of a host message.
    ///
    /// A message without an `"event"` object decodes to an [`EventKind::Other`]
    /// event rather than failing.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if `bytes` is not a JSON object.
    pub fn from_envelope_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut envelope = parse_object(bytes)?;
        match envelope.remove("event") {
            Some(Value::Object(inner)) => Self::from_object(inner),
            _ => Ok(Self::default()),
        }
    }

    fn from_object(object: Map<String, Value>) -> Result<Self, DecodeError> {
        Ok(serde_json::from_value(Value::Object(object))?)
    }
}

fn parse_object(bytes: &[u8]) -> Result<Map<String, Value>, DecodeError> {
    match serde_json::from_slice::<Value>(bytes)? {
        Value::Object(map) => Ok(map),
        other => Err(DecodeError::NotAnObject(json_type_name(&other))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_f64().unwrap_or(0.0))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
