//! Prometheus metrics for the digit-signal bot.
//!
//! Covers:
//! - Tick ingestion and buffer depth
//! - Source clock progress
//! - Slot phase dispatches, degraded signals and revocations
//! - Candidate confidence
//! - WebSocket connection state
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. Registration only fails on duplicate
//! metric names, which is a programming error caught on first access.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram_vec, register_int_gauge,
    register_int_gauge_vec, CounterVec, Gauge, HistogramVec, IntGauge, IntGaugeVec,
};

/// Ticks accepted into a rolling buffer.
pub static TICKS_INGESTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "dsig_ticks_ingested_total",
        "Total ticks accepted into rolling buffers",
        &["instrument"]
    )
    .unwrap()
});

/// Stream messages dropped before reaching a buffer.
/// Labels: reason (unknown_instrument/parse_error/api_error)
pub static TICKS_DROPPED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "dsig_ticks_dropped_total",
        "Total stream messages dropped before buffering",
        &["reason"]
    )
    .unwrap()
});

/// Current rolling buffer length per instrument.
pub static BUFFER_LEN: Lazy<IntGaugeVec> = Lazy::new(|| {
    register_int_gauge_vec!(
        "dsig_buffer_len",
        "Current rolling buffer length",
        &["instrument"]
    )
    .unwrap()
});

/// Latest source epoch observed (Unix seconds).
pub static SOURCE_EPOCH: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("dsig_source_epoch", "Latest source timestamp in seconds").unwrap()
});

/// Slot phase dispatches.
/// Labels: phase (advance_notice/firing/expiry), outcome (sent/failed)
pub static PHASE_DISPATCHED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "dsig_phase_dispatched_total",
        "Total slot phase messages dispatched",
        &["phase", "outcome"]
    )
    .unwrap()
});

/// Phases dispatched without a candidate.
pub static DEGRADED_SIGNAL_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "dsig_degraded_signal_total",
        "Total phase messages sent without a candidate",
        &["phase"]
    )
    .unwrap()
});

/// Revocation attempts.
/// Labels: outcome (ok/failed)
pub static REVOKE_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "dsig_revoke_total",
        "Total message revocation attempts",
        &["outcome"]
    )
    .unwrap()
});

/// Confidence of selected candidates.
pub static CANDIDATE_CONFIDENCE: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "dsig_candidate_confidence",
        "Confidence of selected candidates",
        &["instrument", "rule"],
        vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0]
    )
    .unwrap()
});

/// WebSocket connection state (1 = connected, 0 = disconnected).
pub static WS_CONNECTED: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "dsig_ws_connected",
        "WebSocket connection state (1=connected)"
    )
    .unwrap()
});

/// Total WebSocket reconnection attempts.
pub static WS_RECONNECT_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "dsig_ws_reconnect_total",
        "Total WebSocket reconnection attempts",
        &["reason"]
    )
    .unwrap()
});

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Record a tick accepted into a buffer, with the resulting length.
    pub fn tick_ingested(instrument: &str, buffer_len: usize) {
        TICKS_INGESTED_TOTAL.with_label_values(&[instrument]).inc();
        BUFFER_LEN
            .with_label_values(&[instrument])
            .set(buffer_len as i64);
    }

    /// Record a dropped stream message.
    pub fn tick_dropped(reason: &str) {
        TICKS_DROPPED_TOTAL.with_label_values(&[reason]).inc();
    }

    /// Record the latest source epoch.
    pub fn source_epoch(epoch: i64) {
        SOURCE_EPOCH.set(epoch);
    }

    /// Record a phase dispatch outcome.
    pub fn phase_dispatched(phase: &str, delivered: bool) {
        let outcome = if delivered { "sent" } else { "failed" };
        PHASE_DISPATCHED_TOTAL
            .with_label_values(&[phase, outcome])
            .inc();
    }

    /// Record a phase sent without a candidate.
    pub fn degraded_signal(phase: &str) {
        DEGRADED_SIGNAL_TOTAL.with_label_values(&[phase]).inc();
    }

    /// Record a revocation outcome.
    pub fn revoke(ok: bool) {
        let outcome = if ok { "ok" } else { "failed" };
        REVOKE_TOTAL.with_label_values(&[outcome]).inc();
    }

    /// Record the confidence of a selected candidate.
    pub fn candidate_selected(instrument: &str, rule: &str, confidence: f64) {
        CANDIDATE_CONFIDENCE
            .with_label_values(&[instrument, rule])
            .observe(confidence);
    }

    /// Record WebSocket connected.
    pub fn ws_connected() {
        WS_CONNECTED.set(1.0);
    }

    /// Record WebSocket disconnected.
    pub fn ws_disconnected() {
        WS_CONNECTED.set(0.0);
    }

    /// Record WebSocket reconnection.
    pub fn ws_reconnect(reason: &str) {
        WS_RECONNECT_TOTAL.with_label_values(&[reason]).inc();
    }
}
