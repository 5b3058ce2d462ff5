//! Slot boundaries derived from the source clock.

use crate::config::SchedulerConfig;

/// Phase boundaries of one slot, in source-clock seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotWindow {
    pub slot_epoch: i64,
    pub advance_notice_epoch: i64,
    pub expiry_epoch: i64,
}

impl SlotWindow {
    /// `advance_notice_epoch <= t < slot_epoch`.
    pub fn in_advance_window(&self, t: i64) -> bool {
        self.advance_notice_epoch <= t && t < self.slot_epoch
    }

    pub fn is_due(&self, t: i64) -> bool {
        t >= self.slot_epoch
    }

    pub fn is_expired(&self, t: i64) -> bool {
        t >= self.expiry_epoch
    }
}

/// Aligned cadence over the source clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotClock {
    interval: i64,
    advance_offset: i64,
    expiry_offset: i64,
}

impl SlotClock {
    /// Offsets are in seconds. `interval` must be positive.
    pub fn new(interval: i64, advance_offset: i64, expiry_offset: i64) -> Self {
        debug_assert!(interval > 0);
        Self {
            interval,
            advance_offset,
            expiry_offset,
        }
    }

    /// Build from a validated configuration.
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new(
            config.interval_secs as i64,
            config.advance_offset_secs as i64,
            config.expiry_offset_secs as i64,
        )
    }

    pub fn interval(&self) -> i64 {
        self.interval
    }

    /// Next boundary strictly after `t`, `None` if it does not fit in `i64`.
    pub fn next_slot(&self, t: i64) -> Option<i64> {
        t.div_euclid(self.interval)
            .checked_add(1)?
            .checked_mul(self.interval)
    }

    /// `None` when a phase boundary does not fit in `i64`.
    pub fn window(&self, slot_epoch: i64) -> Option<SlotWindow> {
        Some(SlotWindow {
            slot_epoch,
            advance_notice_epoch: slot_epoch.checked_sub(self.advance_offset)?,
            expiry_epoch: slot_epoch.checked_add(self.expiry_offset)?,
        })
    }

    /// Window of the next boundary strictly after `t`.
    pub fn next_window(&self, t: i64) -> Option<SlotWindow> {
        self.window(self.next_slot(t)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> SlotClock {
        SlotClock::from_config(&SchedulerConfig::default())
    }

    #[test]
    fn test_next_slot_strictly_future() {
        let clock = clock();
        assert_eq!(clock.next_slot(0), Some(600));
        assert_eq!(clock.next_slot(599), Some(600));
        assert_eq!(clock.next_slot(600), Some(1200));
        assert_eq!(clock.next_slot(1_700_000_123), Some(1_700_000_400));
    }

    #[test]
    fn test_next_slot_negative_time() {
        let clock = clock();
        assert_eq!(clock.next_slot(-1), Some(0));
        assert_eq!(clock.next_slot(-600), Some(0));
    }

    #[test]
    fn test_next_slot_monotonic() {
        let clock = clock();
        let mut previous = clock.next_slot(0).unwrap();
        for t in 1..5000 {
            let next = clock.next_slot(t).unwrap();
            assert!(next >= previous);
            assert!(next > t);
            previous = next;
        }
    }

    #[test]
    fn test_window_bounds() {
        let window = clock().window(600).unwrap();
        assert_eq!(window.advance_notice_epoch, 480);
        assert_eq!(window.expiry_epoch, 900);

        assert!(!window.in_advance_window(479));
        assert!(window.in_advance_window(480));
        assert!(window.in_advance_window(599));
        assert!(!window.in_advance_window(600));
        assert!(window.is_due(600));
        assert!(!window.is_expired(899));
        assert!(window.is_expired(900));
    }

    #[test]
    fn test_unrepresentable_boundaries() {
        let clock = clock();
        assert_eq!(clock.next_slot(i64::MAX - 10), None);
        assert_eq!(clock.next_window(i64::MAX - 10), None);
        assert_eq!(clock.window(i64::MAX - 100), None);
        assert_eq!(clock.window(i64::MIN + 10), None);

        let last = i64::MAX - i64::MAX.rem_euclid(600);
        assert_eq!(clock.next_slot(last - 1), Some(last));
        assert_eq!(clock.next_slot(last), None);
    }
}
