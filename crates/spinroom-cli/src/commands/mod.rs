pub mod completions;
pub mod config;
pub mod history;
pub mod spin;
pub mod watch;
