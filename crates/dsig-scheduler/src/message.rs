//! Structured slot messages handed to the dispatcher.

use crate::slot::Phase;
use dsig_detector::Candidate;

/// Content of one phase message. Rendering is up to the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalMessage {
    AdvanceNotice {
        slot_epoch: i64,
        /// Seconds from the evaluation time to the slot.
        lead_secs: i64,
        candidate: Option<Candidate>,
    },
    Firing {
        slot_epoch: i64,
        expiry_epoch: i64,
        candidate: Option<Candidate>,
    },
    Expiry {
        expiry_epoch: i64,
        next_slot_epoch: i64,
    },
}

impl SignalMessage {
    pub fn phase(&self) -> Phase {
        match self {
            Self::AdvanceNotice { .. } => Phase::AdvanceNotice,
            Self::Firing { .. } => Phase::Firing,
            Self::Expiry { .. } => Phase::Expiry,
        }
    }

    pub fn candidate(&self) -> Option<&Candidate> {
        match self {
            Self::AdvanceNotice { candidate, .. } | Self::Firing { candidate, .. } => {
                candidate.as_ref()
            }
            Self::Expiry { .. } => None,
        }
    }

    /// A notice or firing without a candidate.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, Self::Expiry { .. }) && self.candidate().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_variants() {
        let notice = SignalMessage::AdvanceNotice {
            slot_epoch: 600,
            lead_secs: 120,
            candidate: None,
        };
        assert!(notice.is_degraded());
        assert_eq!(notice.phase(), Phase::AdvanceNotice);

        let expiry = SignalMessage::Expiry {
            expiry_epoch: 900,
            next_slot_epoch: 1200,
        };
        assert!(!expiry.is_degraded());
        assert!(expiry.candidate().is_none());
    }
}
