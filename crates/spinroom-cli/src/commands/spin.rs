use spinroom_core::events::{at_ms, Event};
use spinroom_core::{
    now_ms, AllowanceTracker, Config, Database, ReelMachine, SpinOutcome,
};

use crate::terminal::TerminalSink;

const LIMIT_NOTICE: &str = "You have reached the spin limit. Please wait to spin again.";
const JACKPOT_NOTICE: &str = "Congratulations! You hit the jackpot! 🎉";

fn print_event(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

/// Consume one spin and, if granted, run the reels and log the result.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let mut tracker = AllowanceTracker::new(&db, TerminalSink, config.allowance.policy());

    let now = now_ms();
    match tracker.request_spin(now) {
        SpinOutcome::Granted { remaining } => {
            let mut machine = ReelMachine::from_config(&config.reels);
            let reels = machine.spin();
            // The unit is already spent, so a history fault must not hide the grant.
            if let Err(e) = db.record_spin(at_ms(now), &reels) {
                tracing::warn!(error = %e, "failed to record spin history");
            }

            eprintln!("{}", reels.reels.join(" "));
            if reels.jackpot {
                eprintln!("{JACKPOT_NOTICE}");
            }
            print_event(&Event::SpinGranted {
                remaining,
                reels,
                at: at_ms(now),
            })?;
        }
        SpinOutcome::Denied {
            cooldown_remaining_ms,
        } => {
            eprintln!("{LIMIT_NOTICE}");
            print_event(&Event::SpinDenied {
                cooldown_remaining_ms,
                at: at_ms(now),
            })?;
        }
    }
    Ok(())
}

/// Print the allowance after applying any due refill.
pub fn status() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let tracker = AllowanceTracker::new(&db, TerminalSink, config.allowance.policy());

    let snapshot = tracker.snapshot(now_ms());
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
