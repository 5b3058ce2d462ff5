//! Core domain types for the digit-signal bot.
//!
//! This crate provides the fundamental types shared by every other crate:
//! - `InstrumentId`: Symbol of a streamed instrument (e.g. `R_10`)
//! - `Quote`: Price as received from the tick stream (exact decimal or raw text)
//! - `Tick`: One `(instrument, quote, epoch)` observation
//! - `DigitRule`: Threshold predicate evaluated on a last digit

pub mod error;
pub mod instrument;
pub mod quote;
pub mod rule;
pub mod tick;

pub use error::{CoreError, Result};
pub use instrument::InstrumentId;
pub use quote::{last_digit, Quote};
pub use rule::{DigitRule, RuleKind};
pub use tick::{is_valid_epoch, Tick, MAX_EPOCH};
