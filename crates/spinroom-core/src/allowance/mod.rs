//! Spin allowance and cooldown.
//!
//! A player holds up to `max_spins` spins. Each granted spin consumes one and
//! restarts the cooldown clock; once the count reaches zero further spins are
//! denied until `cooldown_ms` has passed since the last grant, at which point the
//! allowance refills in full.
//!
//! ## State Transitions
//!
//! ```text
//! Available --last spin consumed--> Cooldown --cooldown elapsed--> Available
//! ```
//!
//! The refill is evaluated lazily whenever the record is read, and also by the
//! countdown `tick` that runs while in `Cooldown`. Both go through
//! [`AllowanceTracker::evaluate`].

mod countdown;
pub mod driver;
mod tracker;

pub use countdown::{CooldownBreakdown, CountdownHandle};
pub use driver::drive_countdown;
pub use tracker::AllowanceTracker;

use serde::{Deserialize, Serialize};

/// The persisted allowance record.
///
/// Field names on the wire are `count` and `lastSpin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceState {
    #[serde(rename = "count")]
    pub remaining: u32,
    /// Epoch milliseconds of the last grant or full refill, 0 if never.
    #[serde(rename = "lastSpin")]
    pub last_grant_time: u64,
}

impl AllowanceState {
    /// Full allowance that has never been granted from.
    pub fn full(max_spins: u32) -> Self {
        Self {
            remaining: max_spins,
            last_grant_time: 0,
        }
    }

    pub fn phase(&self) -> AllowancePhase {
        if self.remaining > 0 {
            AllowancePhase::Available
        } else {
            AllowancePhase::Cooldown
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllowancePhase {
    Available,
    Cooldown,
}

/// Limits the tracker enforces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowancePolicy {
    pub max_spins: u32,
    pub cooldown_ms: u64,
    /// Key the record is stored under.
    pub storage_key: String,
}

impl Default for AllowancePolicy {
    fn default() -> Self {
        Self {
            max_spins: 10,
            cooldown_ms: 2 * 60 * 60 * 1000,
            storage_key: "spinData".to_string(),
        }
    }
}

/// Result of [`AllowanceTracker::request_spin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SpinOutcome {
    /// One unit consumed; `remaining` is what is left afterwards.
    Granted { remaining: u32 },
    /// Allowance exhausted. State is untouched.
    Denied { cooldown_remaining_ms: u64 },
}

impl SpinOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, SpinOutcome::Granted { .. })
    }
}

/// Result of one countdown [`AllowanceTracker::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still cooling down.
    Counting {
        cooldown_remaining_ms: u64,
        display: CooldownBreakdown,
    },
    /// Spins are available again. The countdown sequence has ended.
    Refilled { remaining: u32 },
    /// The handle belongs to a cancelled or finished sequence. Nothing happened.
    Stale,
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uses_wire_field_names() {
        let state = AllowanceState {
            remaining: 9,
            last_grant_time: 1000,
        };
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"count":9,"lastSpin":1000}"#);
    }

    #[test]
    fn negative_count_is_not_a_valid_record() {
        assert!(serde_json::from_str::<AllowanceState>(r#"{"count":-1,"lastSpin":0}"#).is_err());
    }

    #[test]
    fn phase_follows_remaining() {
        assert_eq!(AllowanceState::full(10).phase(), AllowancePhase::Available);
        let empty = AllowanceState {
            remaining: 0,
            last_grant_time: 5,
        };
        assert_eq!(empty.phase(), AllowancePhase::Cooldown);
    }
}
