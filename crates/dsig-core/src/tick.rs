//! Tick observations delivered by the stream.

use crate::{InstrumentId, Quote};
use serde::{Deserialize, Serialize};

/// Latest epoch accepted from the stream (9999-12-31T23:59:59Z).
pub const MAX_EPOCH: i64 = 253_402_300_799;

/// Whether `epoch` lies in `0..=MAX_EPOCH`.
#[inline]
pub fn is_valid_epoch(epoch: i64) -> bool {
    (0..=MAX_EPOCH).contains(&epoch)
}

/// One price observation.
///
/// `epoch` is the source timestamp in Unix seconds. It is the only time
/// authority for scheduling; local wall-clock time is never consulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub instrument: InstrumentId,
    pub quote: Quote,
    pub epoch: i64,
}

impl Tick {
    pub fn new(instrument: InstrumentId, quote: Quote, epoch: i64) -> Self {
        Self {
            instrument,
            quote,
            epoch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_range() {
        assert!(is_valid_epoch(0));
        assert!(is_valid_epoch(1_700_000_000));
        assert!(is_valid_epoch(MAX_EPOCH));
        assert!(!is_valid_epoch(-1));
        assert!(!is_valid_epoch(MAX_EPOCH + 1));
        assert!(!is_valid_epoch(i64::MAX - 10));
    }
}
