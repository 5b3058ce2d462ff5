//! Prometheus metrics and structured logging for digit-signal.
//!
//! Provides:
//! - Prometheus metrics for ingestion, slot phases and dispatch outcomes
//! - Structured JSON logging with tracing
//! - Periodic session statistics output

pub mod error;
pub mod logging;
pub mod metrics;
pub mod session_stats;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
pub use session_stats::{InstrumentSessionStats, PhaseSessionStats, SessionStatsReporter};
