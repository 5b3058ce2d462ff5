//! Detector configuration.

use dsig_core::DigitRule;
use serde::{Deserialize, Serialize};

/// Configuration for candidate selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Instruments with fewer buffered values are skipped.
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    /// Rules evaluated for every instrument, in ranking order.
    #[serde(default = "default_rules")]
    pub rules: Vec<DigitRule>,
}

fn default_min_samples() -> usize {
    100
}

fn default_rules() -> Vec<DigitRule> {
    vec![DigitRule::over(3), DigitRule::under(6)]
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_samples: default_min_samples(),
            rules: default_rules(),
        }
    }
}

impl DetectorConfig {
    /// Validate configuration values.
    ///
    /// Returns Err if:
    /// - min_samples < 2 (no transition can be observed)
    /// - the rule set is empty
    /// - a rule can never be satisfied
    pub fn validate(&self) -> Result<(), String> {
        if self.min_samples < 2 {
            return Err(format!(
                "min_samples ({}) must be at least 2",
                self.min_samples
            ));
        }

        if self.rules.is_empty() {
            return Err("at least one rule is required".to_string());
        }

        for rule in &self.rules {
            rule.validate().map_err(|e| e.to_string())?;
        }

        Ok(())
    }
}
