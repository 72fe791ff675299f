mod config;
pub mod database;
pub mod migrations;
mod repository;

pub use config::{ChoresConfig, Config, StatsConfig, TimeConfig};
pub use database::HouseholdDb;
pub use repository::{ChoreRepository, CompletionLog, PersonRepository};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `HOUSEHOLD_DATA_DIR` wins when set. Otherwise this is
/// `~/.config/household/`, or `~/.config/household-dev/` when
/// `HOUSEHOLD_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("HOUSEHOLD_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("HOUSEHOLD_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("household-dev")
            } else {
                base_dir.join("household")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
