//! Async countdown loop.

use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};

use super::{AllowanceTracker, CountdownHandle, TickOutcome};
use crate::sink::DisplaySink;
use crate::storage::KvStore;

/// Tick `handle` every `period` until the sequence ends.
///
/// Returns [`TickOutcome::Refilled`] once spins are available again, or
/// [`TickOutcome::Stale`] if the sequence was superseded or cancelled in the
/// meantime. `clock` supplies the epoch-millisecond timestamp for each tick.
pub async fn drive_countdown<S, D, C>(
    tracker: &mut AllowanceTracker<S, D>,
    handle: CountdownHandle,
    period: Duration,
    mut clock: C,
) -> TickOutcome
where
    S: KvStore,
    D: DisplaySink,
    C: FnMut() -> u64,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match tracker.tick(handle, clock()) {
            TickOutcome::Counting { .. } => continue,
            finished => return finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allowance::AllowancePolicy;
    use crate::sink::{RecordingSink, SinkUpdate};
    use crate::storage::MemoryStore;

    fn exhausted_tracker() -> AllowanceTracker<MemoryStore, RecordingSink> {
        let store = MemoryStore::with_entry("spinData", r#"{"count":0,"lastSpin":1000}"#);
        let policy = AllowancePolicy {
            cooldown_ms: 5_000,
            ..AllowancePolicy::default()
        };
        AllowanceTracker::new(store, RecordingSink::new(), policy)
    }

    #[tokio::test]
    async fn drives_until_refilled() {
        let mut tracker = exhausted_tracker();
        tracker.refresh_display(1000);
        let handle = tracker.active_countdown().unwrap();

        let mut now = 1000;
        let outcome = drive_countdown(&mut tracker, handle, Duration::from_millis(1), || {
            now += 1000;
            now
        })
        .await;

        assert_eq!(outcome, TickOutcome::Refilled { remaining: 10 });
        let cooldown_ticks = tracker
            .sink()
            .updates()
            .iter()
            .filter(|u| matches!(u, SinkUpdate::Cooldown { .. }))
            .count();
        // One from refresh_display, then 4s, 3s, 2s, 1s.
        assert_eq!(cooldown_ticks, 5);
        assert_eq!(tracker.sink().enabled(), Some(true));
        assert!(tracker.active_countdown().is_none());
    }

    #[tokio::test]
    async fn superseded_sequence_stops() {
        let mut tracker = exhausted_tracker();
        let stale = tracker.start_countdown();
        tracker.start_countdown();

        let outcome =
            drive_countdown(&mut tracker, stale, Duration::from_millis(1), || 2000).await;
        assert_eq!(outcome, TickOutcome::Stale);
        assert!(tracker.sink().updates().is_empty());
    }
}
