//! Per-slot lifecycle state.

use crate::clock::SlotWindow;
use crate::dispatcher::MessageHandle;
use dsig_detector::Candidate;
use std::fmt;

/// Lifecycle state of one slot. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlotPhase {
    Pending,
    AdvanceNoticeSent,
    Fired,
    Expired,
}

/// A transition emitted for a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    AdvanceNotice,
    Firing,
    Expiry,
}

impl Phase {
    /// Metric and log label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdvanceNotice => "advance_notice",
            Self::Firing => "firing",
            Self::Expiry => "expiry",
        }
    }

    /// State reached once this transition has been emitted.
    pub fn target(&self) -> SlotPhase {
        match self {
            Self::AdvanceNotice => SlotPhase::AdvanceNoticeSent,
            Self::Firing => SlotPhase::Fired,
            Self::Expiry => SlotPhase::Expired,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of one open slot.
///
/// Created when its `slot_epoch` is first computed and dropped once its
/// expiry has been emitted.
#[derive(Debug, Clone)]
pub struct SlotRecord {
    pub window: SlotWindow,
    pub phase: SlotPhase,
    /// Candidate chosen at advance notice, reused at firing.
    pub candidate: Option<Candidate>,
    /// Handles of revocable messages, revoked at expiry.
    pub handles: Vec<MessageHandle>,
}

impl SlotRecord {
    pub fn new(window: SlotWindow) -> Self {
        Self {
            window,
            phase: SlotPhase::Pending,
            candidate: None,
            handles: Vec::new(),
        }
    }

    /// The transition due at source time `t`, if any.
    ///
    /// A slot whose advance window has passed without a notice goes
    /// straight to firing.
    pub fn next_due(&self, t: i64) -> Option<Phase> {
        match self.phase {
            SlotPhase::Pending if self.window.in_advance_window(t) => Some(Phase::AdvanceNotice),
            SlotPhase::Pending | SlotPhase::AdvanceNoticeSent if self.window.is_due(t) => {
                Some(Phase::Firing)
            }
            SlotPhase::Fired if self.window.is_expired(t) => Some(Phase::Expiry),
            _ => None,
        }
    }

    /// Record a transition. Ignored unless it moves the phase forward.
    pub fn advance(&mut self, phase: Phase) -> bool {
        let target = phase.target();
        if target > self.phase {
            self.phase = target;
            true
        } else {
            false
        }
    }
}
