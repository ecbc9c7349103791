mod config;
pub mod database;
pub mod migrations;
pub mod traits;

pub use config::{Config, DisplayConfig, RecapSection, StreakConfig};
pub use database::PactStore;
pub use traits::{CheckInReader, DateRange, PactReader};

use std::path::PathBuf;

use crate::error::Result;

/// Returns the pactroom data directory, creating it if needed.
///
/// `PACTROOM_DATA_DIR` overrides the location entirely. Otherwise the
/// directory is `~/.config/pactroom`, or `~/.config/pactroom-dev` when
/// `PACTROOM_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("PACTROOM_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("PACTROOM_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pactroom-dev")
            } else {
                base_dir.join("pactroom")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
