mod config;
pub mod database;
mod memory;

pub use config::{AllowanceConfig, Config, ReelsConfig};
pub use database::{Database, SpinRecord, SpinStats};
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::StorageError;

/// String key-value persistence used for the allowance record.
///
/// Values are opaque strings; the tracker owns their encoding.
pub trait KvStore {
    /// Fetch the value stored under `key`, or `None` if nothing was written yet.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// Returns the data directory, creating it if needed.
///
/// `SPINROOM_DATA_DIR` overrides the location. Otherwise this is
/// `~/.config/spinroom[-dev]/`, with SPINROOM_ENV=dev selecting the development
/// directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("SPINROOM_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("SPINROOM_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("spinroom-dev")
            } else {
                base_dir.join("spinroom")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
