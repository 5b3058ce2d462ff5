//! Slot scheduler.
//!
//! Owns the open slot records and drives them from the source clock. Every
//! poll evaluates each open slot in ascending `slot_epoch` order and emits
//! all transitions that are due, so a clock jump can carry one slot through
//! firing and expiry in a single poll.
//!
//! The scheduler never consults local wall-clock time for decisions; the
//! poll timer only bounds how late a clock advance is noticed.

use crate::clock::SlotClock;
use crate::config::SchedulerConfig;
use crate::dispatcher::{DynDispatcher, MessageHandle};
use crate::error::{SchedulerError, SchedulerResult};
use crate::message::SignalMessage;
use crate::slot::{Phase, SlotPhase, SlotRecord};
use dsig_detector::{Candidate, CandidateSelector};
use dsig_feed::TickStore;
use dsig_telemetry::Metrics;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One emitted transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTransition {
    pub slot_epoch: i64,
    pub phase: Phase,
    /// Source time at which the transition was emitted.
    pub at: i64,
    /// Dispatcher handle, `None` if delivery failed.
    pub handle: Option<MessageHandle>,
    /// Sent without a candidate.
    pub degraded: bool,
}

/// Drives slot lifecycles from the tick store's source clock.
pub struct SlotScheduler {
    clock: SlotClock,
    selector: CandidateSelector,
    store: Arc<TickStore>,
    dispatcher: DynDispatcher,
    poll_interval: Duration,
    slots: BTreeMap<i64, SlotRecord>,
    /// Highest slot epoch whose expiry has been emitted.
    last_closed: Option<i64>,
    /// Latest source time evaluated.
    last_seen: Option<i64>,
}

impl SlotScheduler {
    pub fn new(
        config: &SchedulerConfig,
        selector: CandidateSelector,
        store: Arc<TickStore>,
        dispatcher: DynDispatcher,
    ) -> SchedulerResult<Self> {
        config.validate().map_err(SchedulerError::InvalidConfig)?;
        Ok(Self {
            clock: SlotClock::from_config(config),
            selector,
            store,
            dispatcher,
            poll_interval: config.poll_interval(),
            slots: BTreeMap::new(),
            last_closed: None,
            last_seen: None,
        })
    }

    pub fn clock(&self) -> &SlotClock {
        &self.clock
    }

    /// Phase of an open slot. `None` once it has expired or if it was
    /// never opened.
    pub fn phase_of(&self, slot_epoch: i64) -> Option<SlotPhase> {
        self.slots.get(&slot_epoch).map(|record| record.phase)
    }

    /// Epochs of all open slots, ascending.
    pub fn open_slots(&self) -> Vec<i64> {
        self.slots.keys().copied().collect()
    }

    /// Evaluate at the store's latest source time. Does nothing until the
    /// first tick has arrived.
    pub async fn poll(&mut self) -> Vec<PhaseTransition> {
        match self.store.latest_epoch() {
            Some(t) => self.poll_at(t).await,
            None => Vec::new(),
        }
    }

    /// Evaluate at source time `t`.
    ///
    /// A `t` older than the latest one already evaluated is ignored, as is
    /// a `t` whose next slot window cannot be represented.
    pub async fn poll_at(&mut self, t: i64) -> Vec<PhaseTransition> {
        if let Some(seen) = self.last_seen {
            if t < seen {
                debug!(t, last_seen = seen, "Source time went backwards, ignoring");
                return Vec::new();
            }
        }
        let Some(window) = self.clock.next_window(t) else {
            warn!(t, "Source time out of range, ignoring");
            return Vec::new();
        };
        self.last_seen = Some(t);

        if self.last_closed.map_or(true, |closed| window.slot_epoch > closed) {
            self.slots.entry(window.slot_epoch).or_insert_with(|| {
                info!(
                    slot_epoch = window.slot_epoch,
                    advance_notice_epoch = window.advance_notice_epoch,
                    expiry_epoch = window.expiry_epoch,
                    "Slot opened"
                );
                SlotRecord::new(window)
            });
        }

        let mut transitions = Vec::new();
        for slot_epoch in self.open_slots() {
            while let Some(phase) = self.slots.get(&slot_epoch).and_then(|r| r.next_due(t)) {
                transitions.push(self.execute(slot_epoch, phase, t).await);
            }
        }
        transitions
    }

    async fn execute(&mut self, slot_epoch: i64, phase: Phase, t: i64) -> PhaseTransition {
        match phase {
            Phase::AdvanceNotice => self.send_advance_notice(slot_epoch, t).await,
            Phase::Firing => self.send_firing(slot_epoch, t).await,
            Phase::Expiry => self.send_expiry(slot_epoch, t).await,
        }
    }

    async fn send_advance_notice(&mut self, slot_epoch: i64, t: i64) -> PhaseTransition {
        let candidate = self.select_candidate();
        let message = SignalMessage::AdvanceNotice {
            slot_epoch,
            lead_secs: slot_epoch - t,
            candidate: candidate.clone(),
        };
        let degraded = message.is_degraded();
        let handle = self.dispatch(message, true).await;

        if let Some(record) = self.slots.get_mut(&slot_epoch) {
            record.candidate = candidate;
            record.handles.extend(handle);
            record.advance(Phase::AdvanceNotice);
        }

        info!(slot_epoch, t, delivered = handle.is_some(), degraded, "Advance notice sent");
        PhaseTransition {
            slot_epoch,
            phase: Phase::AdvanceNotice,
            at: t,
            handle,
            degraded,
        }
    }

    fn expiry_of(&self, slot_epoch: i64) -> i64 {
        self.clock
            .window(slot_epoch)
            .map_or(slot_epoch, |window| window.expiry_epoch)
    }

    async fn send_firing(&mut self, slot_epoch: i64, t: i64) -> PhaseTransition {
        let (stored, expiry_epoch) = match self.slots.get(&slot_epoch) {
            Some(record) => (record.candidate.clone(), record.window.expiry_epoch),
            None => (None, self.expiry_of(slot_epoch)),
        };
        let candidate = match stored {
            Some(candidate) => Some(candidate),
            None => self.select_candidate(),
        };

        let message = SignalMessage::Firing {
            slot_epoch,
            expiry_epoch,
            candidate: candidate.clone(),
        };
        let degraded = message.is_degraded();
        let handle = self.dispatch(message, true).await;

        if let Some(record) = self.slots.get_mut(&slot_epoch) {
            record.candidate = candidate;
            record.handles.extend(handle);
            record.advance(Phase::Firing);
        }

        info!(slot_epoch, t, delivered = handle.is_some(), degraded, "Signal fired");
        PhaseTransition {
            slot_epoch,
            phase: Phase::Firing,
            at: t,
            handle,
            degraded,
        }
    }

    async fn send_expiry(&mut self, slot_epoch: i64, t: i64) -> PhaseTransition {
        let expiry_epoch = self
            .slots
            .get(&slot_epoch)
            .map_or_else(|| self.expiry_of(slot_epoch), |r| r.window.expiry_epoch);
        let message = SignalMessage::Expiry {
            expiry_epoch,
            next_slot_epoch: slot_epoch.saturating_add(self.clock.interval()),
        };
        let handle = self.dispatch(message, false).await;

        let handles = self
            .slots
            .remove(&slot_epoch)
            .map(|record| record.handles)
            .unwrap_or_default();
        self.last_closed = Some(self.last_closed.map_or(slot_epoch, |c| c.max(slot_epoch)));

        for old in &handles {
            self.revoke(*old).await;
        }

        info!(slot_epoch, t, revoked = handles.len(), "Slot expired");
        PhaseTransition {
            slot_epoch,
            phase: Phase::Expiry,
            at: t,
            handle,
            degraded: false,
        }
    }

    fn select_candidate(&self) -> Option<Candidate> {
        let snapshots = self.store.snapshot_all();
        let candidate = self.selector.select(&snapshots);
        if let Some(c) = &candidate {
            Metrics::candidate_selected(c.instrument.as_str(), &c.rule.to_string(), c.confidence);
        }
        candidate
    }

    async fn dispatch(&self, message: SignalMessage, revocable: bool) -> Option<MessageHandle> {
        let phase = message.phase();
        if message.is_degraded() {
            warn!(phase = %phase, "No candidate available, sending degraded message");
            Metrics::degraded_signal(phase.as_str());
        }

        let handle = self.dispatcher.dispatch(message, revocable).await;
        Metrics::phase_dispatched(phase.as_str(), handle.is_some());
        if handle.is_none() {
            warn!(phase = %phase, "Dispatch failed, phase marked done");
        }
        handle
    }

    async fn revoke(&self, handle: MessageHandle) -> bool {
        let ok = self.dispatcher.revoke(handle).await;
        Metrics::revoke(ok);
        if !ok {
            warn!(handle = handle.0, "Failed to revoke message");
        }
        ok
    }

    /// Revoke every handle still held by open slots and drop the records.
    /// Returns the number of revoke attempts.
    pub async fn shutdown(&mut self) -> usize {
        let slots = std::mem::take(&mut self.slots);
        let mut attempts = 0;
        for (slot_epoch, record) in slots {
            for handle in record.handles {
                debug!(slot_epoch, handle = handle.0, "Revoking on shutdown");
                self.revoke(handle).await;
                attempts += 1;
            }
        }
        info!(attempts, "Scheduler shutdown revoke pass complete");
        attempts
    }

    /// Run until the token is cancelled, then perform the shutdown pass.
    ///
    /// Wakes on the poll timer or as soon as the store's source clock
    /// advances.
    pub async fn run(mut self, token: CancellationToken) {
        info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            interval_secs = self.clock.interval(),
            "Scheduler started"
        );

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut waiting_logged = false;

        loop {
            let store = self.store.clone();
            tokio::select! {
                () = token.cancelled() => break,
                _ = ticker.tick() => {}
                () = store.epoch_advanced() => {}
            }

            if self.store.latest_epoch().is_none() {
                if !waiting_logged {
                    info!("Waiting for first tick to sync source time");
                    waiting_logged = true;
                }
                continue;
            }

            self.poll().await;
        }

        info!("Scheduler cancelled");
        self.shutdown().await;
    }
}
