use serde::{Deserialize, Serialize};

/// Hours/minutes/seconds shown while the cooldown runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownBreakdown {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl CooldownBreakdown {
    /// Partial seconds round up, so the display reads 0s only once the wait is over.
    pub fn from_millis(ms: u64) -> Self {
        let total_secs = ms.div_ceil(1000);
        Self {
            hours: total_secs / 3600,
            minutes: (total_secs % 3600) / 60,
            seconds: total_secs % 60,
        }
    }
}

/// Identifies one countdown sequence started by a tracker.
///
/// Only the most recently issued handle is live; ticking with any other handle
/// is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CountdownHandle {
    generation: u64,
}

/// Single-owner slot for the live countdown sequence.
#[derive(Debug, Default)]
pub(super) struct CountdownSlot {
    active: Option<CountdownHandle>,
    issued: u64,
}

impl CountdownSlot {
    /// Issue a new handle, invalidating the previous one.
    pub(super) fn start(&mut self) -> CountdownHandle {
        self.issued += 1;
        let handle = CountdownHandle {
            generation: self.issued,
        };
        self.active = Some(handle);
        handle
    }

    pub(super) fn cancel(&mut self) -> Option<CountdownHandle> {
        self.active.take()
    }

    pub(super) fn active(&self) -> Option<CountdownHandle> {
        self.active
    }

    pub(super) fn is_live(&self, handle: CountdownHandle) -> bool {
        self.active == Some(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakdown_splits_hours_minutes_seconds() {
        assert_eq!(
            CooldownBreakdown::from_millis(6_701_000),
            CooldownBreakdown {
                hours: 1,
                minutes: 51,
                seconds: 41
            }
        );
        assert_eq!(
            CooldownBreakdown::from_millis(7_200_000),
            CooldownBreakdown {
                hours: 2,
                minutes: 0,
                seconds: 0
            }
        );
    }

    #[test]
    fn breakdown_rounds_partial_seconds_up() {
        assert_eq!(CooldownBreakdown::from_millis(1).seconds, 1);
        assert_eq!(CooldownBreakdown::from_millis(0).seconds, 0);
        assert_eq!(CooldownBreakdown::from_millis(59_001).minutes, 1);
    }

    #[test]
    fn breakdown_does_not_wrap_past_a_day() {
        assert_eq!(CooldownBreakdown::from_millis(30 * 3_600_000).hours, 30);
    }

    #[test]
    fn starting_invalidates_previous_handle() {
        let mut slot = CountdownSlot::default();
        let first = slot.start();
        let second = slot.start();
        assert_ne!(first, second);
        assert!(!slot.is_live(first));
        assert!(slot.is_live(second));

        assert_eq!(slot.cancel(), Some(second));
        assert!(!slot.is_live(second));
        assert!(slot.active().is_none());
    }
}
