//! Display sink contract.
//!
//! The allowance tracker never renders anything itself. Whatever shows the spin
//! counter and the spin button implements [`DisplaySink`] and receives updates.

use serde::{Deserialize, Serialize};

pub trait DisplaySink {
    fn set_spins_remaining_text(&mut self, remaining: u32);
    fn set_cooldown_text(&mut self, hours: u64, minutes: u64, seconds: u64);
    fn set_enabled(&mut self, enabled: bool);
}

impl<T: DisplaySink + ?Sized> DisplaySink for &mut T {
    fn set_spins_remaining_text(&mut self, remaining: u32) {
        (**self).set_spins_remaining_text(remaining)
    }

    fn set_cooldown_text(&mut self, hours: u64, minutes: u64, seconds: u64) {
        (**self).set_cooldown_text(hours, minutes, seconds)
    }

    fn set_enabled(&mut self, enabled: bool) {
        (**self).set_enabled(enabled)
    }
}

/// Label for the spin counter.
pub fn spins_remaining_label(remaining: u32) -> String {
    format!("{remaining} Spins Left")
}

/// Label shown while the cooldown runs.
pub fn cooldown_label(hours: u64, minutes: u64, seconds: u64) -> String {
    format!("Next spins in {hours}h {minutes}m {seconds}s")
}

/// One notification received by a [`RecordingSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkUpdate {
    SpinsRemaining { remaining: u32 },
    Cooldown { hours: u64, minutes: u64, seconds: u64 },
    Enabled { enabled: bool },
}

/// Sink that keeps every update in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    updates: Vec<SinkUpdate>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> &[SinkUpdate] {
        &self.updates
    }

    pub fn last(&self) -> Option<SinkUpdate> {
        self.updates.last().copied()
    }

    /// Most recent enable/disable signal.
    pub fn enabled(&self) -> Option<bool> {
        self.updates.iter().rev().find_map(|u| match u {
            SinkUpdate::Enabled { enabled } => Some(*enabled),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.updates.clear();
    }
}

impl DisplaySink for RecordingSink {
    fn set_spins_remaining_text(&mut self, remaining: u32) {
        self.updates.push(SinkUpdate::SpinsRemaining { remaining });
    }

    fn set_cooldown_text(&mut self, hours: u64, minutes: u64, seconds: u64) {
        self.updates.push(SinkUpdate::Cooldown {
            hours,
            minutes,
            seconds,
        });
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.updates.push(SinkUpdate::Enabled { enabled });
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn set_spins_remaining_text(&mut self, _remaining: u32) {}
    fn set_cooldown_text(&mut self, _hours: u64, _minutes: u64, _seconds: u64) {}
    fn set_enabled(&mut self, _enabled: bool) {}
}
