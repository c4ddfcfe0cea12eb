use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::allowance::AllowancePhase;
use crate::reels::ReelOutcome;

/// Every state change the front end reports is an Event.
/// The CLI prints them as JSON, one per line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SpinGranted {
        remaining: u32,
        reels: ReelOutcome,
        at: DateTime<Utc>,
    },
    /// Spin refused while the cooldown runs. Not a fault.
    SpinDenied {
        cooldown_remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// Cooldown elapsed and the allowance was refilled.
    AllowanceRefilled {
        remaining: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: AllowancePhase,
        remaining: u32,
        max_spins: u32,
        last_grant_ms: u64,
        cooldown_remaining_ms: u64,
        at: DateTime<Utc>,
    },
}

/// Convert epoch milliseconds to a UTC timestamp, clamping out-of-range values
/// to the epoch.
pub fn at_ms(epoch_ms: u64) -> DateTime<Utc> {
    i64::try_from(epoch_ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_default()
}
