//! Integration tests for the allowance tracker over real storage.

use proptest::prelude::*;
use spinroom_core::{
    AllowancePolicy, AllowanceState, AllowanceTracker, Database, KvStore, MemoryStore, NullSink,
    RecordingSink, SinkUpdate, SpinOutcome, TickOutcome,
};

const COOLDOWN: u64 = 7_200_000;

#[test]
fn test_allowance_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spinroom.db");

    {
        let db = Database::open_at(&path).unwrap();
        let mut tracker = AllowanceTracker::new(db, NullSink, AllowancePolicy::default());
        for i in 0..3 {
            assert!(tracker.request_spin(1000 + i).is_granted());
        }
    }

    let db = Database::open_at(&path).unwrap();
    let tracker = AllowanceTracker::new(db, NullSink, AllowancePolicy::default());
    assert_eq!(
        tracker.stored_state(),
        AllowanceState {
            remaining: 7,
            last_grant_time: 1002
        }
    );
}

#[test]
fn test_full_window_cycle() {
    let db = Database::open_memory().unwrap();
    let mut tracker = AllowanceTracker::new(db, RecordingSink::new(), AllowancePolicy::default());

    let mut now = 1_000;
    for expected in (0..10).rev() {
        assert_eq!(
            tracker.request_spin(now),
            SpinOutcome::Granted {
                remaining: expected
            }
        );
        now += 10_000;
    }
    let last_grant = now - 10_000;

    let before = tracker.stored_state();
    let denied = tracker.request_spin(now);
    assert_eq!(
        denied,
        SpinOutcome::Denied {
            cooldown_remaining_ms: last_grant + COOLDOWN - now
        }
    );
    assert_eq!(tracker.stored_state(), before);

    // The countdown started by the last grant was replaced by the denial's.
    let handle = tracker.active_countdown().unwrap();
    assert!(matches!(
        tracker.tick(handle, now + 1_000),
        TickOutcome::Counting { .. }
    ));
    assert_eq!(
        tracker.tick(handle, last_grant + COOLDOWN),
        TickOutcome::Refilled { remaining: 10 }
    );
    assert_eq!(tracker.sink().enabled(), Some(true));
    assert_eq!(
        tracker.sink().last(),
        Some(SinkUpdate::Enabled { enabled: true })
    );

    assert_eq!(
        tracker.request_spin(last_grant + COOLDOWN + 1),
        SpinOutcome::Granted { remaining: 9 }
    );
}

#[test]
fn test_overlapping_countdowns_reset_once() {
    let store = MemoryStore::with_entry("spinData", r#"{"count":0,"lastSpin":0}"#);
    let mut tracker = AllowanceTracker::new(&store, RecordingSink::new(), AllowancePolicy::default());

    let old = tracker.start_countdown();
    tracker.refresh_display(1_000);
    let current = tracker.active_countdown().unwrap();
    assert_ne!(old, current);

    let mut refills = 0;
    let mut now = COOLDOWN - 3_000;
    while now <= COOLDOWN + 3_000 {
        for handle in [old, current] {
            if let TickOutcome::Refilled { .. } = tracker.tick(handle, now) {
                refills += 1;
            }
        }
        now += 1_000;
    }

    assert_eq!(refills, 1);
    let enables = tracker
        .sink()
        .updates()
        .iter()
        .filter(|u| matches!(u, SinkUpdate::Enabled { enabled: true }))
        .count();
    assert_eq!(enables, 1);
    assert_eq!(
        store.get("spinData").unwrap().as_deref(),
        Some(r#"{"count":10,"lastSpin":7200000}"#)
    );
}

#[test]
fn test_custom_storage_key_and_policy() {
    let store = MemoryStore::new();
    let policy = AllowancePolicy {
        max_spins: 2,
        cooldown_ms: 60_000,
        storage_key: "player-1".into(),
    };
    let mut tracker = AllowanceTracker::new(&store, NullSink, policy);

    assert!(tracker.request_spin(10).is_granted());
    assert!(tracker.request_spin(20).is_granted());
    assert_eq!(
        tracker.request_spin(30),
        SpinOutcome::Denied {
            cooldown_remaining_ms: 59_990
        }
    );
    assert!(store.get("spinData").unwrap().is_none());
    assert!(store.get("player-1").unwrap().is_some());
}

proptest! {
    #[test]
    fn remaining_stays_in_bounds(steps in prop::collection::vec(0u64..3_000_000, 1..60)) {
        let policy = AllowancePolicy::default();
        let mut tracker = AllowanceTracker::new(MemoryStore::new(), NullSink, policy.clone());
        let mut now = 1_000u64;

        for step in steps {
            now += step;
            let before = tracker.stored_state();
            let outcome = tracker.request_spin(now);
            let after = tracker.stored_state();

            prop_assert!(after.remaining <= policy.max_spins);
            match outcome {
                SpinOutcome::Granted { remaining } => {
                    prop_assert_eq!(after.remaining, remaining);
                    prop_assert_eq!(after.last_grant_time, now);
                }
                SpinOutcome::Denied { cooldown_remaining_ms } => {
                    prop_assert_eq!(after, before);
                    prop_assert!(cooldown_remaining_ms > 0);
                    prop_assert!(cooldown_remaining_ms <= policy.cooldown_ms);
                }
            }
        }
    }

    #[test]
    fn max_grants_per_window(max_spins in 1u32..20, gap in 0u64..1_000) {
        let policy = AllowancePolicy { max_spins, ..AllowancePolicy::default() };
        let mut tracker = AllowanceTracker::new(MemoryStore::new(), NullSink, policy);
        let mut now = 5_000u64;

        for _ in 0..max_spins {
            prop_assert!(tracker.request_spin(now).is_granted());
            now += gap;
        }
        prop_assert!(!tracker.request_spin(now).is_granted());
    }

    #[test]
    fn elapsed_cooldown_always_refills(remaining in 0u32..=10, last in 0u64..1_000_000_000, extra in 0u64..10_000_000) {
        let record = format!(r#"{{"count":{remaining},"lastSpin":{last}}}"#);
        let store = MemoryStore::with_entry("spinData", &record);
        let tracker = AllowanceTracker::new(store, NullSink, AllowancePolicy::default());

        let state = tracker.evaluate(last + COOLDOWN + extra);
        prop_assert_eq!(state.remaining, 10);
    }
}
