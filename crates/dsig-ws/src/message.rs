//! Deriv WebSocket message types.
//!
//! Outgoing requests are small fixed shapes. Incoming frames are kept as
//! raw JSON tagged with their `msg_type`; decoding of ticks belongs to the
//! feed layer.

use crate::error::{WsError, WsResult};
use serde::Serialize;
use serde_json::Value;

/// Outgoing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DerivRequest {
    /// Subscribe to the tick stream of one symbol.
    Ticks { ticks: String, subscribe: u8 },
    /// Application-level keepalive.
    Ping { ping: u8 },
    /// Ask for the current server time.
    Time { time: u8 },
}

impl DerivRequest {
    pub fn subscribe_ticks(symbol: impl Into<String>) -> Self {
        Self::Ticks {
            ticks: symbol.into(),
            subscribe: 1,
        }
    }

    pub fn ping() -> Self {
        Self::Ping { ping: 1 }
    }

    pub fn time() -> Self {
        Self::Time { time: 1 }
    }

    pub fn to_json(&self) -> WsResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Incoming frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivMessage {
    /// Value of the top-level `msg_type` field.
    pub msg_type: String,
    /// The whole decoded frame.
    pub body: Value,
}

impl DerivMessage {
    /// Decode a text frame. Frames must be JSON objects carrying `msg_type`.
    pub fn parse(text: &str) -> WsResult<Self> {
        let body: Value = serde_json::from_str(text)?;
        let msg_type = body
            .get("msg_type")
            .and_then(Value::as_str)
            .ok_or_else(|| WsError::InvalidFrame("missing msg_type".to_string()))?
            .to_string();
        Ok(Self { msg_type, body })
    }

    /// Reply to an application-level ping.
    pub fn is_pong(&self) -> bool {
        self.msg_type == "ping"
    }

    /// Whether the frame carries an API error object.
    pub fn is_error(&self) -> bool {
        self.body.get("error").is_some()
    }
}
