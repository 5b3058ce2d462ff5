//! Instrument identification.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stream symbol of an instrument (e.g. `R_10`, `R_100`).
///
/// Ordering is lexicographic on the symbol; collections keyed by
/// `InstrumentId` iterate in that order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentId(String);

impl InstrumentId {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    /// Create from a symbol, rejecting empty or whitespace-only input.
    pub fn parse(symbol: &str) -> Result<Self> {
        let trimmed = symbol.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidInstrument(
                "symbol must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstrumentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims() {
        let id = InstrumentId::parse("  R_10 ").unwrap();
        assert_eq!(id.as_str(), "R_10");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(InstrumentId::parse("   ").is_err());
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let mut ids = vec![
            InstrumentId::from("R_25"),
            InstrumentId::from("R_10"),
            InstrumentId::from("R_100"),
        ];
        ids.sort();
        assert_eq!(ids[0].as_str(), "R_10");
        assert_eq!(ids[1].as_str(), "R_100");
        assert_eq!(ids[2].as_str(), "R_25");
    }
}
