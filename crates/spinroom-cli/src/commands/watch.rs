use std::time::Duration;

use spinroom_core::events::{at_ms, Event};
use spinroom_core::{drive_countdown, now_ms, AllowanceTracker, Config, Database, TickOutcome};

use crate::terminal::TerminalSink;

/// Show the countdown once a second until the allowance refills.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let mut tracker = AllowanceTracker::new(&db, TerminalSink, config.allowance.policy());

    let state = tracker.refresh_display(now_ms());
    let Some(handle) = tracker.active_countdown() else {
        println!(
            "{}",
            serde_json::to_string(&tracker.snapshot(now_ms()))?
        );
        tracing::debug!(remaining = state.remaining, "no cooldown running");
        return Ok(());
    };

    let period = Duration::from_millis(config.allowance.tick_interval_ms);
    match drive_countdown(&mut tracker, handle, period, now_ms).await {
        TickOutcome::Refilled { remaining } => {
            let event = Event::AllowanceRefilled {
                remaining,
                at: at_ms(now_ms()),
            };
            println!("{}", serde_json::to_string(&event)?);
        }
        other => tracing::warn!(?other, "countdown ended without a refill"),
    }
    Ok(())
}
