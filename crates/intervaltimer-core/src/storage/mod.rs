mod config;
pub mod database;
mod store;

pub use config::{Config, SoundConfig, TimerConfig, UiConfig};
pub use database::WorkoutDb;
pub use store::{MemoryStore, WorkoutStore};

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// `INTERVALTIMER_DATA_DIR` wins when set. Otherwise this is
/// `~/.config/intervaltimer/`, or `~/.config/intervaltimer-dev/` with
/// `INTERVALTIMER_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("INTERVALTIMER_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env =
                std::env::var("INTERVALTIMER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("intervaltimer-dev")
            } else {
                base_dir.join("intervaltimer")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
