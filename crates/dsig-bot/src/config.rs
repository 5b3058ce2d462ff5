//! Application configuration.

use crate::error::{AppError, AppResult};
use dsig_core::InstrumentId;
use dsig_detector::DetectorConfig;
use dsig_notify::TelegramConfig;
use dsig_scheduler::SchedulerConfig;
use dsig_ws::ConnectionConfig;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Duration;

/// Largest accepted display-zone offset, exclusive.
const MAX_UTC_OFFSET_MINUTES: i32 = 24 * 60;

/// Where slot messages are delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// Render and log messages only; no credentials needed.
    #[default]
    DryRun,
    /// Post to a Telegram chat; token read from `DSIG_TELEGRAM_TOKEN`.
    Telegram,
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub mode: DeliveryMode,
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    #[serde(default = "default_instruments")]
    pub instruments: Vec<InstrumentConfig>,
    /// Rolling buffer capacity per instrument.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
    #[serde(default)]
    pub websocket: WsConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

fn default_ws_url() -> String {
    "wss://ws.binaryws.com/websockets/v3?app_id=1089".to_string()
}

fn default_buffer_capacity() -> usize {
    5000
}

fn default_instruments() -> Vec<InstrumentConfig> {
    [10, 25, 50, 75, 100]
        .into_iter()
        .map(|n| InstrumentConfig {
            symbol: format!("R_{n}"),
            display_name: Some(format!("Volatility {n} Index")),
        })
        .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: DeliveryMode::default(),
            ws_url: default_ws_url(),
            instruments: default_instruments(),
            buffer_capacity: default_buffer_capacity(),
            websocket: WsConfig::default(),
            detector: DetectorConfig::default(),
            scheduler: SchedulerConfig::default(),
            telegram: TelegramConfig::default(),
            display: DisplayConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

/// One streamed instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    /// Stream symbol, e.g. `R_10`.
    pub symbol: String,
    /// Name shown in messages; the symbol is used when absent.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// WebSocket configuration subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WsConfig {
    /// Maximum reconnection attempts (0 = infinite).
    pub max_reconnect_attempts: u32,
    /// Base delay for reconnection backoff (ms).
    pub reconnect_base_delay_ms: u64,
    /// Backoff ceiling (ms).
    pub reconnect_max_delay_ms: u64,
    /// Application-level ping interval (ms).
    pub ping_interval_ms: u64,
    /// Pong deadline (ms).
    pub pong_timeout_ms: u64,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            max_reconnect_attempts: 0,
            reconnect_base_delay_ms: 3000,
            reconnect_max_delay_ms: 60000,
            ping_interval_ms: 30000,
            pong_timeout_ms: 10000,
        }
    }
}

impl From<WsConfig> for ConnectionConfig {
    fn from(cfg: WsConfig) -> Self {
        Self {
            url: String::new(),   // Set separately
            symbols: Vec::new(), // Set separately from instruments
            max_reconnect_attempts: cfg.max_reconnect_attempts,
            reconnect_base_delay_ms: cfg.reconnect_base_delay_ms,
            reconnect_max_delay_ms: cfg.reconnect_max_delay_ms,
            ping_interval_ms: cfg.ping_interval_ms,
            pong_timeout_ms: cfg.pong_timeout_ms,
        }
    }
}

/// How times are shown in messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Offset east of UTC in minutes (180 = UTC+03:00).
    pub utc_offset_minutes: i32,
    pub zone_label: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 180,
            zone_label: "Nairobi".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Period of the session statistics summary.
    pub stats_interval_secs: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            stats_interval_secs: 3600,
        }
    }
}

impl TelemetryConfig {
    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs)
    }
}

impl AppConfig {
    /// Load configuration from `DSIG_CONFIG` or `config/default.toml`.
    pub fn load() -> AppResult<Self> {
        let config_path =
            std::env::var("DSIG_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Validate every section.
    pub fn validate(&self) -> AppResult<()> {
        if !(self.ws_url.starts_with("ws://") || self.ws_url.starts_with("wss://")) {
            return Err(AppError::Config(format!(
                "ws_url must be a ws:// or wss:// URL, got {}",
                self.ws_url
            )));
        }

        if self.instruments.is_empty() {
            return Err(AppError::Config("at least one instrument is required".to_string()));
        }
        let mut seen = BTreeSet::new();
        for instrument in &self.instruments {
            let id = InstrumentId::parse(&instrument.symbol)?;
            if !seen.insert(id.clone()) {
                return Err(AppError::Config(format!("duplicate instrument {id}")));
            }
        }

        if self.buffer_capacity < self.detector.min_samples {
            return Err(AppError::Config(format!(
                "buffer_capacity ({}) must be at least detector.min_samples ({})",
                self.buffer_capacity, self.detector.min_samples
            )));
        }

        self.websocket.validate().map_err(AppError::Config)?;
        self.detector
            .validate()
            .map_err(|e| AppError::Config(format!("detector: {e}")))?;
        self.scheduler
            .validate()
            .map_err(|e| AppError::Config(format!("scheduler: {e}")))?;
        if self.mode == DeliveryMode::Telegram {
            self.telegram.validate().map_err(AppError::Config)?;
        }

        if self.display.utc_offset_minutes.abs() >= MAX_UTC_OFFSET_MINUTES {
            return Err(AppError::Config(format!(
                "display.utc_offset_minutes ({}) out of range",
                self.display.utc_offset_minutes
            )));
        }
        if self.telemetry.stats_interval_secs == 0 {
            return Err(AppError::Config(
                "telemetry.stats_interval_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Connection settings with URL and subscriptions filled in.
    pub fn connection_config(&self) -> ConnectionConfig {
        let mut config: ConnectionConfig = self.websocket.clone().into();
        config.url = self.ws_url.clone();
        config.symbols = self
            .instruments
            .iter()
            .map(|i| i.symbol.trim().to_string())
            .collect();
        config
    }

    pub fn instrument_ids(&self) -> AppResult<Vec<InstrumentId>> {
        self.instruments
            .iter()
            .map(|i| InstrumentId::parse(&i.symbol).map_err(AppError::from))
            .collect()
    }

    /// Symbol → display name, for instruments that have one.
    pub fn display_names(&self) -> BTreeMap<InstrumentId, String> {
        self.instruments
            .iter()
            .filter_map(|i| {
                let name = i.display_name.as_ref()?;
                let id = InstrumentId::parse(&i.symbol).ok()?;
                Some((id, name.clone()))
            })
            .collect()
    }
}

impl WsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.ping_interval_ms == 0 || self.pong_timeout_ms == 0 {
            return Err("websocket ping_interval_ms and pong_timeout_ms must be positive".to_string());
        }
        if self.reconnect_base_delay_ms > self.reconnect_max_delay_ms {
            return Err(format!(
                "websocket reconnect_base_delay_ms ({}) exceeds reconnect_max_delay_ms ({})",
                self.reconnect_base_delay_ms, self.reconnect_max_delay_ms
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsig_core::DigitRule;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.mode, DeliveryMode::DryRun);
        assert_eq!(config.instruments.len(), 5);
        assert_eq!(config.buffer_capacity, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.scheduler.interval_secs, 600);
        assert_eq!(config.display.zone_label, "Nairobi");
        assert_eq!(config.instruments[0].symbol, "R_10");
    }

    #[test]
    fn test_parse_sections() {
        let config = AppConfig::from_toml(
            r#"
            mode = "telegram"
            buffer_capacity = 300

            [[instruments]]
            symbol = "R_50"
            display_name = "Volatility 50 Index"

            [[instruments]]
            symbol = "1HZ10V"

            [detector]
            min_samples = 200
            rules = [{ kind = "under", threshold = 5 }]

            [scheduler]
            interval_secs = 300
            advance_offset_secs = 60
            expiry_offset_secs = 120

            [telegram]
            chat_id = -1001234

            [display]
            utc_offset_minutes = 0
            zone_label = "UTC"
            "#,
        )
        .unwrap();

        assert_eq!(config.mode, DeliveryMode::Telegram);
        assert_eq!(config.detector.rules, vec![DigitRule::under(5)]);
        assert_eq!(config.scheduler.interval_secs, 300);
        assert_eq!(config.scheduler.poll_interval_ms, 800);
        assert_eq!(config.telegram.chat_id, -1001234);
        assert!(config.validate().is_ok());

        let names = config.display_names();
        assert_eq!(names.len(), 1);
        assert_eq!(names[&InstrumentId::new("R_50")], "Volatility 50 Index");
    }

    #[test]
    fn test_invalid_mode_rejected() {
        assert!(AppConfig::from_toml(r#"mode = "live""#).is_err());
    }

    #[test]
    fn test_validate_rejections() {
        let mut config = AppConfig {
            ws_url: "https://example.com".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config = AppConfig {
            instruments: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let mut dup = AppConfig::default();
        dup.instruments.push(InstrumentConfig {
            symbol: " R_10 ".to_string(),
            display_name: None,
        });
        assert!(dup.validate().is_err());

        config = AppConfig {
            buffer_capacity: 50,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.scheduler.advance_offset_secs = 600;
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.display.utc_offset_minutes = 1440;
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.websocket.reconnect_base_delay_ms = 120_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_telegram_section_checked_only_in_telegram_mode() {
        let mut config = AppConfig::default();
        assert_eq!(config.telegram.chat_id, 0);
        assert!(config.validate().is_ok());

        config.mode = DeliveryMode::Telegram;
        assert!(config.validate().is_err());

        config.telegram.chat_id = 42;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_connection_config() {
        let config = AppConfig::default();
        let conn = config.connection_config();
        assert_eq!(conn.url, config.ws_url);
        assert_eq!(conn.symbols, vec!["R_10", "R_25", "R_50", "R_75", "R_100"]);
        assert_eq!(conn.ping_interval_ms, 30000);
        assert_eq!(conn.max_reconnect_attempts, 0);
    }
}
