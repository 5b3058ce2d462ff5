//! Shared tick state.
//!
//! All rolling buffers and the latest source timestamp live behind one
//! mutex. Every access is a single short critical section, so a snapshot
//! never observes a half-applied tick and the timestamp always agrees with
//! the buffer contents it was read with.

use crate::buffer::RollingBuffer;
use dsig_core::{InstrumentId, Quote, Tick};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tokio::sync::futures::Notified;
use tokio::sync::Notify;

#[derive(Debug)]
struct StoreInner {
    buffers: BTreeMap<InstrumentId, RollingBuffer<Quote>>,
    latest_epoch: Option<i64>,
}

impl StoreInner {
    /// Raise the latest epoch. Returns true if it strictly advanced.
    fn advance_epoch(&mut self, epoch: i64) -> bool {
        match self.latest_epoch {
            Some(current) if current >= epoch => false,
            _ => {
                self.latest_epoch = Some(epoch);
                true
            }
        }
    }
}

/// Rolling buffers for a fixed set of instruments plus the source clock.
#[derive(Debug)]
pub struct TickStore {
    inner: Mutex<StoreInner>,
    epoch_advanced: Notify,
    capacity: usize,
}

impl TickStore {
    /// Create a store with one empty buffer per instrument.
    pub fn new(instruments: impl IntoIterator<Item = InstrumentId>, capacity: usize) -> Self {
        let buffers = instruments
            .into_iter()
            .map(|id| (id, RollingBuffer::new(capacity)))
            .collect();
        Self {
            inner: Mutex::new(StoreInner {
                buffers,
                latest_epoch: None,
            }),
            epoch_advanced: Notify::new(),
            capacity,
        }
    }

    /// Append a quote for `instrument`.
    ///
    /// Returns the buffer length after the push, or `None` when the
    /// instrument is not tracked (nothing is stored).
    pub fn push(&self, instrument: &InstrumentId, quote: Quote) -> Option<usize> {
        let mut inner = self.inner.lock();
        let buffer = inner.buffers.get_mut(instrument)?;
        buffer.push(quote);
        Some(buffer.len())
    }

    /// Apply a tick: append its quote and raise the source clock together.
    ///
    /// Ticks for untracked instruments are ignored entirely, including
    /// their timestamp.
    pub fn ingest(&self, tick: &Tick) -> Option<usize> {
        let (len, advanced) = {
            let mut inner = self.inner.lock();
            let buffer = inner.buffers.get_mut(&tick.instrument)?;
            buffer.push(tick.quote.clone());
            let len = buffer.len();
            (len, inner.advance_epoch(tick.epoch))
        };
        if advanced {
            self.epoch_advanced.notify_waiters();
        }
        Some(len)
    }

    /// Raise the source clock without a quote (server time messages).
    /// Returns true if the clock advanced.
    pub fn observe_epoch(&self, epoch: i64) -> bool {
        let advanced = self.inner.lock().advance_epoch(epoch);
        if advanced {
            self.epoch_advanced.notify_waiters();
        }
        advanced
    }

    /// Latest source timestamp, if any tick has arrived.
    pub fn latest_epoch(&self) -> Option<i64> {
        self.inner.lock().latest_epoch
    }

    /// Point-in-time copy of one buffer.
    pub fn snapshot(&self, instrument: &InstrumentId) -> Option<Vec<Quote>> {
        self.inner.lock().buffers.get(instrument).map(RollingBuffer::to_vec)
    }

    /// Point-in-time copy of every buffer, taken under a single lock.
    pub fn snapshot_all(&self) -> BTreeMap<InstrumentId, Vec<Quote>> {
        self.inner
            .lock()
            .buffers
            .iter()
            .map(|(id, buf)| (id.clone(), buf.to_vec()))
            .collect()
    }

    pub fn len(&self, instrument: &InstrumentId) -> usize {
        self.inner
            .lock()
            .buffers
            .get(instrument)
            .map_or(0, RollingBuffer::len)
    }

    pub fn instruments(&self) -> Vec<InstrumentId> {
        self.inner.lock().buffers.keys().cloned().collect()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Future that resolves the next time the source clock advances.
    ///
    /// Only advances that happen after this future is first polled are
    /// observed; callers pair it with a periodic timer.
    pub fn epoch_advanced(&self) -> Notified<'_> {
        self.epoch_advanced.notified()
    }
}
