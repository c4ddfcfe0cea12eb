//! # Spinroom Core Library
//!
//! This library provides the core logic for Spinroom, a slot-machine mini-game in
//! which a player gets a fixed number of spins per cooldown window. The CLI binary
//! is a thin front end over the same library.
//!
//! ## Architecture
//!
//! - **Allowance Tracker**: a state machine over caller-supplied timestamps that
//!   owns the spin count and the cooldown deadline; the caller drives the countdown
//!   by invoking `tick()` on a fixed cadence
//! - **Storage**: SQLite key-value record plus spin history, TOML configuration
//! - **Display Sink**: trait through which the tracker reports what to show
//! - **Reels**: cosmetic outcome generator behind a seedable RNG
//!
//! ## Key Components
//!
//! - [`AllowanceTracker`]: spin allowance and cooldown state machine
//! - [`Database`]: allowance record and spin history persistence
//! - [`Config`]: application configuration management
//! - [`DisplaySink`]: presentation callbacks

pub mod allowance;
pub mod error;
pub mod events;
pub mod reels;
pub mod sink;
pub mod storage;

pub use allowance::{
    drive_countdown, now_ms, AllowancePhase, AllowancePolicy, AllowanceState, AllowanceTracker,
    CooldownBreakdown, CountdownHandle, SpinOutcome, TickOutcome,
};
pub use error::{ConfigError, CoreError, StorageError};
pub use events::Event;
pub use reels::{ReelMachine, ReelOutcome};
pub use sink::{DisplaySink, NullSink, RecordingSink, SinkUpdate};
pub use storage::{Config, Database, KvStore, MemoryStore, SpinRecord, SpinStats};
