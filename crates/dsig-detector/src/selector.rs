//! Candidate selection across instruments.

use crate::analyzer::analyze;
use crate::candidate::Candidate;
use crate::config::DetectorConfig;
use crate::error::{DetectorError, DetectorResult};
use dsig_core::InstrumentId;
use std::collections::BTreeMap;
use std::fmt::Display;
use tracing::{debug, trace};

/// Picks the single best candidate from a set of buffer snapshots.
#[derive(Debug, Clone)]
pub struct CandidateSelector {
    config: DetectorConfig,
}

impl CandidateSelector {
    pub fn new(config: DetectorConfig) -> DetectorResult<Self> {
        config.validate().map_err(DetectorError::InvalidConfig)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// All candidates of one instrument, in rule order.
    ///
    /// Empty when the snapshot holds fewer than `min_samples` values.
    pub fn evaluate<T: Display>(&self, instrument: &InstrumentId, values: &[T]) -> Vec<Candidate> {
        if values.len() < self.config.min_samples {
            trace!(
                %instrument,
                len = values.len(),
                min = self.config.min_samples,
                "Not enough samples"
            );
            return Vec::new();
        }

        analyze(values, &self.config.rules)
            .into_iter()
            .map(|outcome| Candidate::from_outcome(instrument.clone(), outcome))
            .collect()
    }

    /// Global best over every instrument and rule.
    ///
    /// Candidates are visited in instrument order, then rule order; a later
    /// candidate replaces the current best only when it strictly outranks
    /// it, so full ties keep the first one visited.
    pub fn select<T: Display>(
        &self,
        snapshots: &BTreeMap<InstrumentId, Vec<T>>,
    ) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;

        for (instrument, values) in snapshots {
            for candidate in self.evaluate(instrument, values) {
                let replace = best
                    .as_ref()
                    .map_or(true, |current| candidate.outranks(current));
                if replace {
                    best = Some(candidate);
                }
            }
        }

        match &best {
            Some(c) => debug!(
                instrument = %c.instrument,
                rule = %c.rule,
                digit = c.preceding_digit,
                supporting = c.supporting,
                total = c.total,
                confidence = c.confidence,
                "Candidate selected"
            ),
            None => debug!("No candidate available"),
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsig_core::{DigitRule, Quote};

    fn selector(min_samples: usize) -> CandidateSelector {
        CandidateSelector::new(DetectorConfig {
            min_samples,
            ..Default::default()
        })
        .unwrap()
    }

    fn series(digits: &[u8], repeat: usize) -> Vec<String> {
        digits
            .iter()
            .cycle()
            .take(digits.len() * repeat)
            .map(|d| format!("5.{d}"))
            .collect()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = CandidateSelector::new(DetectorConfig {
            rules: Vec::new(),
            ..Default::default()
        });
        assert!(matches!(result, Err(DetectorError::InvalidConfig(_))));
    }

    #[test]
    fn test_gating_by_min_samples() {
        let selector = selector(100);
        let mut snapshots = BTreeMap::new();
        snapshots.insert(InstrumentId::new("R_10"), series(&[1, 9], 49));
        snapshots.insert(InstrumentId::new("R_25"), series(&[2, 8], 10));

        assert!(selector.select(&snapshots).is_none());
        assert!(selector
            .evaluate(&InstrumentId::new("R_10"), &snapshots[&InstrumentId::new("R_10")])
            .is_empty());
    }

    #[test]
    fn test_digitless_quotes_count_toward_gating_only() {
        let numeric: Vec<Quote> = series(&[1, 9], 49)
            .iter()
            .map(|text| Quote::from_text(text))
            .collect();
        let mut mixed = numeric.clone();
        mixed.insert(10, Quote::from_text("n/a"));
        mixed.insert(51, Quote::from_text("n/a"));
        assert_eq!(mixed.len(), 100);

        let r10 = InstrumentId::new("R_10");
        let with_raw = selector(100).evaluate(&r10, &mixed);
        assert!(!with_raw.is_empty());
        assert!(selector(101).evaluate(&r10, &mixed).is_empty());

        // Same transitions as the numeric quotes alone.
        assert_eq!(with_raw, selector(98).evaluate(&r10, &numeric));
        assert!(with_raw.iter().all(|c| c.total <= 97));
    }

    #[test]
    fn test_empty_snapshots() {
        let snapshots: BTreeMap<InstrumentId, Vec<String>> = BTreeMap::new();
        assert!(selector(2).select(&snapshots).is_none());
    }

    #[test]
    fn test_selects_highest_confidence() {
        let selector = selector(100);
        let mut snapshots = BTreeMap::new();
        // Perfect pattern: 1 is always followed by 9 (Over 3, confidence 1.0).
        snapshots.insert(InstrumentId::new("R_75"), series(&[1, 9], 100));
        // Mixed pattern: lower confidence for every rule.
        snapshots.insert(InstrumentId::new("R_10"), series(&[0, 4, 7, 2, 5], 40));

        let best = selector.select(&snapshots).unwrap();
        assert_eq!(best.instrument.as_str(), "R_75");
        assert_eq!(best.confidence, 1.0);
    }

    #[test]
    fn test_full_tie_keeps_first_instrument_and_rule() {
        let selector = selector(100);
        let data = series(&[1, 9], 100);
        let mut snapshots = BTreeMap::new();
        snapshots.insert(InstrumentId::new("R_50"), data.clone());
        snapshots.insert(InstrumentId::new("R_25"), data);

        let best = selector.select(&snapshots).unwrap();
        assert_eq!(best.instrument.as_str(), "R_25");
        // Over 3 (1→9) and Under 6 (9→1) tie at 1.0; Over 3 has 100 vs 99 support.
        assert_eq!(best.rule, DigitRule::over(3));
        assert_eq!(best.supporting, 100);
    }

    #[test]
    fn test_select_is_deterministic() {
        let selector = selector(100);
        let mut snapshots = BTreeMap::new();
        snapshots.insert(InstrumentId::new("R_10"), series(&[3, 1, 4, 1, 5, 9, 2, 6], 30));
        snapshots.insert(InstrumentId::new("R_100"), series(&[2, 7, 1, 8, 2, 8], 30));

        assert_eq!(selector.select(&snapshots), selector.select(&snapshots));
    }
}
