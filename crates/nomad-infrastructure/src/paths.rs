//! Platform directories for Nomad.
//!
//! ```text
//! ~/.config/nomad/             # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/nomad/        # Data directory
//! ├── store/                   # JSON document store
//! └── logs/                    # Application logs
//!     └── nomad.log.YYYY-MM-DD
//! ```

use std::path::PathBuf;

use nomad_core::error::{NomadError, Result};

const APP_DIR: &str = "nomad";

/// Resolves configuration and data locations via the `dirs` crate.
pub struct NomadPaths;

impl NomadPaths {
    /// Returns the configuration directory (e.g. `~/.config/nomad/`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| NomadError::config("Cannot find config directory"))
    }

    /// Returns the data directory (e.g. `~/.local/share/nomad/`).
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| NomadError::config("Cannot find data directory"))
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Default document store location.
    pub fn store_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("store"))
    }

    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("logs"))
    }
}
