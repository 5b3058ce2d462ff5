//! Selected signal candidates.

use crate::analyzer::RuleOutcome;
use dsig_core::{DigitRule, InstrumentId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Best (instrument, rule, preceding digit) found in one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub instrument: InstrumentId,
    pub rule: DigitRule,
    pub preceding_digit: u8,
    pub supporting: u32,
    pub total: u32,
    /// `supporting / total`.
    pub confidence: f64,
}

impl Candidate {
    pub fn from_outcome(instrument: InstrumentId, outcome: RuleOutcome) -> Self {
        Self {
            instrument,
            rule: outcome.rule,
            preceding_digit: outcome.preceding_digit,
            supporting: outcome.supporting,
            total: outcome.total,
            confidence: outcome.confidence(),
        }
    }

    /// Rank by exact confidence, then by supporting count.
    ///
    /// Confidence is compared as `a.supporting * b.total` against
    /// `b.supporting * a.total`, so equal ratios compare equal regardless
    /// of float rounding.
    pub fn rank(&self, other: &Self) -> Ordering {
        let lhs = u64::from(self.supporting) * u64::from(other.total);
        let rhs = u64::from(other.supporting) * u64::from(self.total);
        lhs.cmp(&rhs)
            .then_with(|| self.supporting.cmp(&other.supporting))
    }

    /// Strictly better than `other`.
    pub fn outranks(&self, other: &Self) -> bool {
        self.rank(other) == Ordering::Greater
    }
}
