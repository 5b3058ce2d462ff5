//! Message parsing for the Deriv tick stream.
//!
//! Turns `tick` frames into [`Tick`] values and `time` frames into a
//! server-time event. Everything else on the stream is ignored.

use crate::error::{FeedError, FeedResult};
use dsig_core::{is_valid_epoch, InstrumentId, Quote, Tick};
use dsig_ws::DerivMessage;
use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

/// Deriv tick payload.
/// Format: {"symbol": "R_10", "quote": 6123.47, "epoch": 1700000000, ...}
#[derive(Debug, Deserialize)]
pub struct RawTick {
    pub symbol: String,
    /// Number normally; strings are accepted and kept verbatim.
    #[serde(default)]
    pub quote: Value,
    pub epoch: i64,
}

/// Deriv API error payload.
#[derive(Debug, Deserialize)]
struct RawApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Parsed feed event.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Tick(Tick),
    /// Server time in Unix seconds.
    ServerTime(i64),
}

/// Message parser.
#[derive(Debug, Default)]
pub struct MessageParser;

impl MessageParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one stream frame.
    ///
    /// Returns `Ok(None)` for frames that carry no tick or time data.
    pub fn parse(&self, msg: &DerivMessage) -> FeedResult<Option<FeedEvent>> {
        if let Some(error) = msg.body.get("error") {
            let raw: RawApiError = serde_json::from_value(error.clone())?;
            return Err(FeedError::Api {
                code: raw.code,
                message: raw.message,
            });
        }

        match msg.msg_type.as_str() {
            "tick" => self.parse_tick(&msg.body).map(Some),
            "time" => {
                let epoch = msg
                    .body
                    .get("time")
                    .and_then(Value::as_i64)
                    .ok_or_else(|| FeedError::ParseError("time frame without time".into()))?;
                Ok(Some(FeedEvent::ServerTime(check_epoch(epoch)?)))
            }
            other => {
                trace!(msg_type = other, "Ignoring frame");
                Ok(None)
            }
        }
    }

    fn parse_tick(&self, body: &Value) -> FeedResult<FeedEvent> {
        let payload = body
            .get("tick")
            .ok_or_else(|| FeedError::ParseError("tick frame without tick".into()))?;
        let raw: RawTick = serde_json::from_value(payload.clone())?;

        let instrument = InstrumentId::parse(&raw.symbol)
            .map_err(|e| FeedError::ParseError(e.to_string()))?;
        let quote = parse_quote(&raw.quote)?;
        let epoch = check_epoch(raw.epoch)?;

        Ok(FeedEvent::Tick(Tick::new(instrument, quote, epoch)))
    }
}

/// Quote from its JSON textual form. Numbers become exact decimals,
/// strings that do not parse are kept as raw text.
fn parse_quote(value: &Value) -> FeedResult<Quote> {
    match value {
        Value::Number(number) => Ok(Quote::from_text(&number.to_string())),
        Value::String(text) => Ok(Quote::from_text(text)),
        Value::Null => Err(FeedError::ParseError("tick without quote".into())),
        other => Err(FeedError::ParseError(format!("unsupported quote {other}"))),
    }
}

fn check_epoch(epoch: i64) -> FeedResult<i64> {
    if is_valid_epoch(epoch) {
        Ok(epoch)
    } else {
        Err(FeedError::ParseError(format!("epoch {epoch} out of range")))
    }
}
