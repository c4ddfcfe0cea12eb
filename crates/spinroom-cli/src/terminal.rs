//! Display sink that writes the player-facing labels to stderr.

use spinroom_core::sink::{cooldown_label, spins_remaining_label};
use spinroom_core::DisplaySink;

#[derive(Debug, Default)]
pub struct TerminalSink;

impl DisplaySink for TerminalSink {
    fn set_spins_remaining_text(&mut self, remaining: u32) {
        eprintln!("{}", spins_remaining_label(remaining));
    }

    fn set_cooldown_text(&mut self, hours: u64, minutes: u64, seconds: u64) {
        eprintln!("{}", cooldown_label(hours, minutes, seconds));
    }

    fn set_enabled(&mut self, enabled: bool) {
        tracing::debug!(enabled, "spin trigger toggled");
        if !enabled {
            eprintln!("Spin button disabled");
        }
    }
}
