//! Digit-transition analysis.
//!
//! For a rule R and consecutive digits `(prev, cur)`, a transition counts
//! toward `counts[prev]` of R whenever `cur` satisfies R. The best
//! preceding digit of a rule is the first maximum over digits 0..=9.

use dsig_core::{last_digit, DigitRule};
use std::fmt::{Display, Write};

/// Last digits of `values` in order. Values without any digit are skipped.
pub fn extract_digits<T: Display>(values: &[T]) -> Vec<u8> {
    let mut text = String::new();
    values
        .iter()
        .filter_map(|value| {
            text.clear();
            // Writing into a String cannot fail.
            let _ = write!(text, "{value}");
            last_digit(&text)
        })
        .collect()
}

/// Transition counts for one rule over one digit sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleStats {
    pub rule: DigitRule,
    /// `counts[d]`: transitions from preceding digit `d` that satisfied the rule.
    pub counts: [u32; 10],
    pub total: u32,
}

impl RuleStats {
    fn new(rule: DigitRule) -> Self {
        Self {
            rule,
            counts: [0; 10],
            total: 0,
        }
    }

    /// Best preceding digit, or `None` when no transition satisfied the rule.
    pub fn outcome(&self) -> Option<RuleOutcome> {
        if self.total == 0 {
            return None;
        }

        let mut best = 0usize;
        for digit in 1..10 {
            if self.counts[digit] > self.counts[best] {
                best = digit;
            }
        }

        Some(RuleOutcome {
            rule: self.rule,
            preceding_digit: best as u8,
            supporting: self.counts[best],
            total: self.total,
        })
    }
}

/// Best preceding digit of one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleOutcome {
    pub rule: DigitRule,
    pub preceding_digit: u8,
    pub supporting: u32,
    pub total: u32,
}

impl RuleOutcome {
    /// `supporting / total`, always within `0.0..=1.0`.
    pub fn confidence(&self) -> f64 {
        f64::from(self.supporting) / f64::from(self.total)
    }
}

/// Count rule-satisfying transitions for every rule.
///
/// Returns one entry per rule, in rule order. With fewer than two digits
/// every entry is empty.
pub fn transition_stats(digits: &[u8], rules: &[DigitRule]) -> Vec<RuleStats> {
    let mut stats: Vec<RuleStats> = rules.iter().copied().map(RuleStats::new).collect();

    for pair in digits.windows(2) {
        let (prev, cur) = (usize::from(pair[0]), pair[1]);
        for entry in &mut stats {
            if entry.rule.matches(cur) {
                entry.counts[prev] += 1;
                entry.total += 1;
            }
        }
    }

    stats
}

/// Analyze a snapshot: one outcome per rule that produced any transition.
pub fn analyze<T: Display>(values: &[T], rules: &[DigitRule]) -> Vec<RuleOutcome> {
    let digits = extract_digits(values);
    if digits.len() < 2 {
        return Vec::new();
    }

    transition_stats(&digits, rules)
        .iter()
        .filter_map(RuleStats::outcome)
        .collect()
}
