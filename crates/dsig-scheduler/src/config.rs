//! Scheduler configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest supported cadence interval (one day).
const MAX_INTERVAL_SECS: u64 = 86_400;

/// Cadence and phase offsets, all in source-clock seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Slot spacing; slots are aligned to multiples of this.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Advance notice opens this long before the slot.
    #[serde(default = "default_advance_offset_secs")]
    pub advance_offset_secs: u64,
    /// Expiry fires this long after the slot.
    #[serde(default = "default_expiry_offset_secs")]
    pub expiry_offset_secs: u64,
    /// Upper bound on the delay between a clock advance and its evaluation.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_interval_secs() -> u64 {
    600
}

fn default_advance_offset_secs() -> u64 {
    120
}

fn default_expiry_offset_secs() -> u64 {
    300
}

fn default_poll_interval_ms() -> u64 {
    800
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            advance_offset_secs: default_advance_offset_secs(),
            expiry_offset_secs: default_expiry_offset_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl SchedulerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Validate configuration values.
    ///
    /// Returns Err if:
    /// - interval_secs is 0 or longer than a day
    /// - advance_offset_secs >= interval_secs
    /// - expiry_offset_secs > interval_secs
    /// - poll_interval_ms is 0
    pub fn validate(&self) -> Result<(), String> {
        if self.interval_secs == 0 || self.interval_secs > MAX_INTERVAL_SECS {
            return Err(format!(
                "interval_secs ({}) must be within 1..={}",
                self.interval_secs, MAX_INTERVAL_SECS
            ));
        }

        if self.advance_offset_secs >= self.interval_secs {
            return Err(format!(
                "advance_offset_secs ({}) must be less than interval_secs ({})",
                self.advance_offset_secs, self.interval_secs
            ));
        }

        if self.expiry_offset_secs > self.interval_secs {
            return Err(format!(
                "expiry_offset_secs ({}) must not exceed interval_secs ({})",
                self.expiry_offset_secs, self.interval_secs
            ));
        }

        if self.poll_interval_ms == 0 {
            return Err("poll_interval_ms must be positive".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.interval_secs, 600);
        assert_eq!(config.advance_offset_secs, 120);
        assert_eq!(config.expiry_offset_secs, 300);
        assert_eq!(config.poll_interval(), Duration::from_millis(800));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_offsets() {
        let config = SchedulerConfig {
            advance_offset_secs: 600,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SchedulerConfig {
            expiry_offset_secs: 601,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SchedulerConfig {
            interval_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: SchedulerConfig = toml::from_str("interval_secs = 300").unwrap();
        assert_eq!(config.interval_secs, 300);
        assert_eq!(config.advance_offset_secs, 120);
        assert!(config.validate().is_ok());
    }
}
