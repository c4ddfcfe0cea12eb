//! Allowance tracker.
//!
//! Operates on caller-supplied timestamps (epoch ms) and never sleeps. The caller
//! drives the countdown by calling `tick()` on a fixed cadence, see
//! [`super::drive_countdown`].
//!
//! ## Usage
//!
//! ```ignore
//! let mut tracker = AllowanceTracker::new(db, sink, AllowancePolicy::default());
//! tracker.refresh_display(now_ms());
//! match tracker.request_spin(now_ms()) {
//!     SpinOutcome::Granted { .. } => { /* run the reels */ }
//!     SpinOutcome::Denied { .. } => { /* tell the player to wait */ }
//! }
//! ```

use tracing::{debug, warn};

use super::countdown::{CooldownBreakdown, CountdownHandle, CountdownSlot};
use super::{AllowancePolicy, AllowanceState, SpinOutcome, TickOutcome};
use crate::error::StorageError;
use crate::events::{at_ms, Event};
use crate::sink::DisplaySink;
use crate::storage::KvStore;

/// Owns allowance arithmetic and cooldown timing.
///
/// The record lives in `store`, not in the tracker, so every operation starts by
/// reading it back. Storage faults never reach the caller: an unreadable record
/// is replaced by a full allowance, and a failed write is logged.
pub struct AllowanceTracker<S: KvStore, D: DisplaySink> {
    store: S,
    sink: D,
    policy: AllowancePolicy,
    countdown: CountdownSlot,
}

impl<S: KvStore, D: DisplaySink> AllowanceTracker<S, D> {
    pub fn new(store: S, sink: D, policy: AllowancePolicy) -> Self {
        Self {
            store,
            sink,
            policy,
            countdown: CountdownSlot::default(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn policy(&self) -> &AllowancePolicy {
        &self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut D {
        &mut self.sink
    }

    /// The persisted record as-is, without applying a due refill or writing.
    pub fn stored_state(&self) -> AllowanceState {
        self.load().0
    }

    /// Milliseconds until the allowance refills, 0 once it is due.
    pub fn cooldown_remaining_ms(&self, state: &AllowanceState, now: u64) -> u64 {
        state
            .last_grant_time
            .saturating_add(self.policy.cooldown_ms)
            .saturating_sub(now)
            .min(self.policy.cooldown_ms)
    }

    /// Handle of the live countdown sequence, if one is running.
    pub fn active_countdown(&self) -> Option<CountdownHandle> {
        self.countdown.active()
    }

    /// Evaluate and describe the allowance as a snapshot event.
    pub fn snapshot(&self, now: u64) -> Event {
        let state = self.evaluate(now);
        Event::StateSnapshot {
            phase: state.phase(),
            remaining: state.remaining,
            max_spins: self.policy.max_spins,
            last_grant_ms: state.last_grant_time,
            cooldown_remaining_ms: if state.remaining > 0 {
                0
            } else {
                self.cooldown_remaining_ms(&state, now)
            },
            at: at_ms(now),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Load the record and apply a refill if the cooldown has elapsed.
    ///
    /// Writes back when the record was refilled or did not exist yet.
    pub fn evaluate(&self, now: u64) -> AllowanceState {
        let (mut state, loaded) = self.load();
        let mut dirty = !loaded;

        if now.saturating_sub(state.last_grant_time) >= self.policy.cooldown_ms {
            if state.remaining != self.policy.max_spins {
                debug!(
                    previous = state.remaining,
                    max_spins = self.policy.max_spins,
                    "cooldown elapsed, refilling allowance"
                );
            }
            state.remaining = self.policy.max_spins;
            state.last_grant_time = now;
            dirty = true;
        }

        if dirty {
            self.persist(&state);
        }
        state
    }

    /// Try to consume one spin.
    ///
    /// Denial is a normal outcome and leaves the record untouched; the sink is
    /// switched to the cooldown display and a fresh countdown sequence starts.
    pub fn request_spin(&mut self, now: u64) -> SpinOutcome {
        let mut state = self.evaluate(now);

        if state.remaining == 0 {
            let cooldown_remaining_ms = self.cooldown_remaining_ms(&state, now);
            debug!(cooldown_remaining_ms, "spin denied");
            self.show_cooldown(cooldown_remaining_ms);
            self.sink.set_enabled(false);
            self.countdown.start();
            return SpinOutcome::Denied {
                cooldown_remaining_ms,
            };
        }

        state.remaining -= 1;
        state.last_grant_time = now;
        self.persist(&state);
        debug!(remaining = state.remaining, "spin granted");

        self.sink.set_spins_remaining_text(state.remaining);
        if state.remaining == 0 {
            self.sink.set_enabled(false);
            self.countdown.start();
        } else {
            self.countdown.cancel();
            self.sink.set_enabled(true);
        }

        SpinOutcome::Granted {
            remaining: state.remaining,
        }
    }

    /// Bring the sink in line with the stored allowance.
    ///
    /// Starts a countdown sequence when in cooldown, cancels any when spins are
    /// available.
    pub fn refresh_display(&mut self, now: u64) -> AllowanceState {
        let state = self.evaluate(now);
        if state.remaining > 0 {
            self.countdown.cancel();
            self.sink.set_spins_remaining_text(state.remaining);
            self.sink.set_enabled(true);
        } else {
            let cooldown_remaining_ms = self.cooldown_remaining_ms(&state, now);
            self.show_cooldown(cooldown_remaining_ms);
            self.sink.set_enabled(false);
            self.countdown.start();
        }
        state
    }

    /// Start a new countdown sequence. Any previous handle goes stale.
    pub fn start_countdown(&mut self) -> CountdownHandle {
        self.countdown.start()
    }

    /// Stop the live countdown sequence, if any.
    pub fn cancel_countdown(&mut self) {
        self.countdown.cancel();
    }

    /// Advance the countdown sequence identified by `handle`.
    ///
    /// Once the cooldown is over the allowance is refilled through
    /// [`evaluate`](Self::evaluate), the sink re-enabled and the sequence ended, so
    /// later ticks with the same handle are [`TickOutcome::Stale`].
    pub fn tick(&mut self, handle: CountdownHandle, now: u64) -> TickOutcome {
        if !self.countdown.is_live(handle) {
            return TickOutcome::Stale;
        }

        let state = self.evaluate(now);
        if state.remaining > 0 {
            self.countdown.cancel();
            self.sink.set_spins_remaining_text(state.remaining);
            self.sink.set_enabled(true);
            debug!(remaining = state.remaining, "countdown finished");
            return TickOutcome::Refilled {
                remaining: state.remaining,
            };
        }

        let cooldown_remaining_ms = self.cooldown_remaining_ms(&state, now);
        let display = self.show_cooldown(cooldown_remaining_ms);
        TickOutcome::Counting {
            cooldown_remaining_ms,
            display,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn show_cooldown(&mut self, cooldown_remaining_ms: u64) -> CooldownBreakdown {
        let display = CooldownBreakdown::from_millis(cooldown_remaining_ms);
        self.sink
            .set_cooldown_text(display.hours, display.minutes, display.seconds);
        display
    }

    /// Returns the record and whether it came from the store.
    fn load(&self) -> (AllowanceState, bool) {
        let key = self.policy.storage_key.as_str();
        let fallback = AllowanceState::full(self.policy.max_spins);

        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return (fallback, false),
            Err(e) => {
                warn!(key, error = %e, "allowance record unreadable, using defaults");
                return (fallback, false);
            }
        };

        match decode(key, &raw) {
            Ok(mut state) => {
                state.remaining = state.remaining.min(self.policy.max_spins);
                (state, true)
            }
            Err(e) => {
                warn!(key, error = %e, "allowance record invalid, using defaults");
                (fallback, false)
            }
        }
    }

    fn persist(&self, state: &AllowanceState) {
        let key = self.policy.storage_key.as_str();
        let result = serde_json::to_string(state)
            .map_err(|e| StorageError::InvalidRecord {
                key: key.to_string(),
                message: e.to_string(),
            })
            .and_then(|json| self.store.set(key, &json));
        if let Err(e) = result {
            warn!(key, error = %e, "failed to persist allowance record");
        }
    }
}

fn decode(key: &str, raw: &str) -> Result<AllowanceState, StorageError> {
    serde_json::from_str(raw).map_err(|e| StorageError::InvalidRecord {
        key: key.to_string(),
        message: e.to_string(),
    })
}
