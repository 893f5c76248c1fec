/**
 * Real-time Wire Envelopes
 *
 * Inbound frames from the two live transports. WebSocket frames carry a
 * `{type, payload}` JSON envelope; SSE events carry free-form `data` that is
 * parsed best-effort as JSON.
 */
use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;

/// WebSocket message envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WsMessage {
    /// Message type, matched against data keys and event types
    #[serde(rename = "type")]
    pub message_type: String,
    /// Message payload (opaque to the sync layer)
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Create a new envelope
    pub fn new(message_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            message_type: message_type.into(),
            payload,
        }
    }

    /// Decode a text frame
    pub fn from_text(text: &str) -> Result<Self, SharedError> {
        let message: WsMessage = serde_json::from_str(text)?;
        if message.message_type.is_empty() {
            return Err(SharedError::validation("type", "message type cannot be empty"));
        }
        Ok(message)
    }

    /// Encode as a text frame
    pub fn to_text(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A single dispatched Server-Sent Event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEvent {
    /// Value of the `event:` field, if any
    pub event: Option<String>,
    /// Joined `data:` lines
    pub data: String,
    /// Value of the `id:` field, if any
    pub id: Option<String>,
}

/// Result of the best-effort JSON parse of an SSE `data` field.
///
/// `Unparseable` is a first-class outcome: the coordinator refreshes on it.
#[derive(Debug, Clone, PartialEq)]
pub enum SseData {
    /// `data` decoded as JSON
    Parsed(serde_json::Value),
    /// `data` was not JSON; the raw text is kept
    Unparseable(String),
}

impl SseEvent {
    /// Create an event carrying only data
    pub fn with_data(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }

    /// Parse the `data` field
    pub fn parse_data(&self) -> SseData {
        match serde_json::from_str::<serde_json::Value>(&self.data) {
            Ok(value) => SseData::Parsed(value),
            Err(_) => SseData::Unparseable(self.data.clone()),
        }
    }
}

impl SseData {
    /// The `type` field of a parsed JSON object
    pub fn event_type(&self) -> Option<&str> {
        match self {
            SseData::Parsed(value) => value.get("type").and_then(|t| t.as_str()),
            SseData::Unparseable(_) => None,
        }
    }
}
