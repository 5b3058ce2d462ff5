//! Exact quote values and last-digit extraction.
//!
//! Numeric quotes are kept as `rust_decimal::Decimal` so the textual form
//! used for digit extraction is exactly what the stream delivered, without
//! float re-rendering. Non-numeric quotes are kept as raw text.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Last decimal digit of a textual value.
///
/// Scans from the least-significant character and returns the first ASCII
/// digit found, so trailing non-digit suffixes are skipped. Returns `None`
/// when the text has no digit at all.
#[inline]
pub fn last_digit(text: &str) -> Option<u8> {
    text.chars()
        .rev()
        .find_map(|c| c.to_digit(10))
        .map(|d| d as u8)
}

/// Quote as delivered by the stream.
///
/// Numeric quotes are kept as exact decimals. Anything else is kept
/// verbatim so it still occupies its buffer slot; digit extraction skips
/// it when it has no digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quote {
    Decimal(Decimal),
    Raw(String),
}

impl Quote {
    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self::Decimal(value)
    }

    /// Decimal when `text` parses as one (plain or scientific), raw text
    /// otherwise.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_or_else(|_| Self::Raw(text.to_string()), Self::Decimal)
    }

    /// Numeric value, `None` for raw quotes.
    #[inline]
    pub fn decimal(&self) -> Option<Decimal> {
        match self {
            Self::Decimal(d) => Some(*d),
            Self::Raw(_) => None,
        }
    }

    /// Last digit of this quote's textual representation.
    pub fn last_digit(&self) -> Option<u8> {
        match self {
            Self::Decimal(d) => last_digit(&d.to_string()),
            Self::Raw(text) => last_digit(text),
        }
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Raw(text) => f.write_str(text),
        }
    }
}

impl FromStr for Quote {
    type Err = rust_decimal::Error;

    /// Strict numeric parse; see [`Quote::from_text`] for the lossless form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::Decimal(s.parse()?))
    }
}

impl From<Decimal> for Quote {
    fn from(d: Decimal) -> Self {
        Self::Decimal(d)
    }
}
