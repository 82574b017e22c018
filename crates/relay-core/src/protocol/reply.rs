//! Replies the stdio host sends back to the browser.
//!
//! The host never acknowledges individual events.  It sends exactly one
//! status frame at startup and one error frame per failed event:
//!
//! ```text
//! {"status":"ready"}
//! {"error":"<description>"}
//! ```

use serde::ser::{Serialize, SerializeMap, Serializer};

/// An outbound host message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostReply {
    /// Startup handshake: the mouse capability is available.
    Ready,
    /// Startup failure or a per-event failure.
    Error(String),
}

impl HostReply {
    /// Builds an error reply from anything displayable.
    pub fn error(description: impl std::fmt::Display) -> Self {
        Self::Error(description.to_string())
    }

    /// Serializes the reply to its JSON frame payload.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails, which cannot happen
    /// for these shapes in practice.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

impl Serialize for HostReply {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Ready => map.serialize_entry("status", "ready")?,
            Self::Error(description) => map.serialize_entry("error", description)?,
        }
        map.end()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
