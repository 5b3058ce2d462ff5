//! Digit rules evaluated on the digit that follows a transition.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a threshold rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Digit strictly greater than the threshold.
    Over,
    /// Digit strictly less than the threshold.
    Under,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Over => write!(f, "Over"),
            Self::Under => write!(f, "Under"),
        }
    }
}

/// Named threshold predicate on a single digit (e.g. "Over 3").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DigitRule {
    pub kind: RuleKind,
    pub threshold: u8,
}

impl DigitRule {
    #[must_use]
    pub const fn over(threshold: u8) -> Self {
        Self {
            kind: RuleKind::Over,
            threshold,
        }
    }

    #[must_use]
    pub const fn under(threshold: u8) -> Self {
        Self {
            kind: RuleKind::Under,
            threshold,
        }
    }

    /// Whether `digit` satisfies this rule.
    #[inline]
    #[must_use]
    pub fn matches(&self, digit: u8) -> bool {
        match self.kind {
            RuleKind::Over => digit > self.threshold,
            RuleKind::Under => digit < self.threshold,
        }
    }

    /// Reject rules that no digit 0-9 can ever satisfy.
    pub fn validate(&self) -> Result<()> {
        let satisfiable = match self.kind {
            RuleKind::Over => self.threshold < 9,
            RuleKind::Under => (1..=10).contains(&self.threshold),
        };
        if satisfiable {
            Ok(())
        } else {
            Err(CoreError::InvalidRule(format!(
                "{self} can never be satisfied by a digit"
            )))
        }
    }
}

impl fmt::Display for DigitRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.threshold)
    }
}
