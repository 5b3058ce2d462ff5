//! Session statistics output.
//!
//! Periodically logs a summary read back from the Prometheus counters:
//! - ticks ingested and buffer depth per instrument
//! - phase dispatch outcomes and degraded signals
//! - revocation outcomes

use crate::metrics::{
    BUFFER_LEN, DEGRADED_SIGNAL_TOTAL, PHASE_DISPATCHED_TOTAL, REVOKE_TOTAL,
    TICKS_INGESTED_TOTAL,
};
use chrono::{DateTime, Utc};
use tracing::info;

const PHASES: [&str; 3] = ["advance_notice", "firing", "expiry"];

/// Statistics for a single instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSessionStats {
    pub instrument: String,
    pub ticks_ingested: u64,
    pub buffer_len: i64,
}

/// Dispatch outcome counts for one phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseSessionStats {
    pub phase: &'static str,
    pub sent: u64,
    pub failed: u64,
    pub degraded: u64,
}

/// Session statistics reporter.
pub struct SessionStatsReporter {
    instruments: Vec<String>,
    start_time: DateTime<Utc>,
}

impl SessionStatsReporter {
    /// Create a new reporter for the given instruments.
    pub fn new(instruments: Vec<String>) -> Self {
        Self {
            instruments,
            start_time: Utc::now(),
        }
    }

    /// Per-instrument statistics.
    pub fn instrument_stats(&self) -> Vec<InstrumentSessionStats> {
        self.instruments
            .iter()
            .map(|instrument| InstrumentSessionStats {
                instrument: instrument.clone(),
                ticks_ingested: TICKS_INGESTED_TOTAL
                    .with_label_values(&[instrument])
                    .get() as u64,
                buffer_len: BUFFER_LEN.with_label_values(&[instrument]).get(),
            })
            .collect()
    }

    /// Per-phase dispatch statistics.
    pub fn phase_stats(&self) -> Vec<PhaseSessionStats> {
        PHASES
            .iter()
            .map(|phase| PhaseSessionStats {
                phase,
                sent: PHASE_DISPATCHED_TOTAL
                    .with_label_values(&[phase, "sent"])
                    .get() as u64,
                failed: PHASE_DISPATCHED_TOTAL
                    .with_label_values(&[phase, "failed"])
                    .get() as u64,
                degraded: DEGRADED_SIGNAL_TOTAL.with_label_values(&[phase]).get() as u64,
            })
            .collect()
    }

    /// Output the session summary to logs.
    pub fn output_summary(&self) {
        let duration = Utc::now() - self.start_time;
        let hours = duration.num_hours();
        let minutes = duration.num_minutes() % 60;

        info!("========== Session Statistics Summary ==========");
        info!(
            "Period: {} ({} hours {} minutes)",
            self.start_time.format("%Y-%m-%d %H:%M:%S UTC"),
            hours,
            minutes
        );

        for s in self.instrument_stats() {
            info!(
                "  {}: ticks={} buffer={}",
                s.instrument, s.ticks_ingested, s.buffer_len
            );
        }

        for p in self.phase_stats() {
            info!(
                "  {}: sent={} failed={} degraded={}",
                p.phase, p.sent, p.failed, p.degraded
            );
        }

        info!(
            "  revocations: ok={} failed={}",
            REVOKE_TOTAL.with_label_values(&["ok"]).get() as u64,
            REVOKE_TOTAL.with_label_values(&["failed"]).get() as u64
        );

        info!("================================================");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Metrics;

    #[test]
    fn test_instrument_stats_reads_counters() {
        Metrics::tick_ingested("STATS_TEST", 1);
        Metrics::tick_ingested("STATS_TEST", 2);

        let reporter = SessionStatsReporter::new(vec!["STATS_TEST".to_string()]);
        let stats = reporter.instrument_stats();

        assert_eq!(stats.len(), 1);
        assert!(stats[0].ticks_ingested >= 2);
        assert_eq!(stats[0].buffer_len, 2);
    }

    #[test]
    fn test_phase_stats_cover_all_phases() {
        let reporter = SessionStatsReporter::new(Vec::new());
        let phases: Vec<_> = reporter.phase_stats().iter().map(|p| p.phase).collect();
        assert_eq!(phases, vec!["advance_notice", "firing", "expiry"]);
        reporter.output_summary();
    }
}
