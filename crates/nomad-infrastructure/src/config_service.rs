//! Configuration service.
//!
//! Loads [`AppConfig`] from `config.toml` (default
//! `~/.config/nomad/config.toml`), writing a default file on first run, then
//! applies environment overrides.

use std::fs;
use std::path::{Path, PathBuf};

use nomad_core::config::AppConfig;
use nomad_core::error::Result;

use crate::paths::NomadPaths;

pub const ENV_API_BASE_URL: &str = "NOMAD_API_BASE_URL";
pub const ENV_IDENTITY_API_KEY: &str = "NOMAD_IDENTITY_API_KEY";
pub const ENV_DATA_DIR: &str = "NOMAD_DATA_DIR";

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Service for the platform config file.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(NomadPaths::config_file()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the config file (creating it with defaults when missing) and
    /// applies `NOMAD_*` environment overrides.
    pub fn load(&self) -> Result<AppConfig> {
        let config = self.load_file()?;
        Ok(apply_overrides(config, |key| std::env::var(key).ok()))
    }

    fn load_file(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            let config = AppConfig::default();
            self.save(&config)?;
            tracing::info!("Created default config at {}", self.path.display());
            return Ok(config);
        }

        let text = fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string_pretty(config)?)?;
        Ok(())
    }
}

/// Overrides file values with non-empty variables from `lookup`.
pub fn apply_overrides(
    mut config: AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> AppConfig {
    let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(base_url) = lookup(ENV_API_BASE_URL) {
        config.api.base_url = base_url;
    }
    if let Some(api_key) = lookup(ENV_IDENTITY_API_KEY) {
        config.identity.api_key = Some(api_key);
    }
    if let Some(data_dir) = lookup(ENV_DATA_DIR) {
        config.store.data_dir = Some(PathBuf::from(data_dir));
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use nomad_core::config::IdentityProviderKind;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("nomad/config.toml"));

        let config = service.load_file().unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(service.path().exists());
    }

    #[test]
    fn test_reads_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "[api]\ntimeout_secs = 5\n\n[identity]\nprovider = \"identity_toolkit\"\n",
        )
        .unwrap();

        let config = ConfigService::new(&path).load_file().unwrap();
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.identity.provider, IdentityProviderKind::IdentityToolkit);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[api\n").unwrap();

        assert!(ConfigService::new(&path).load_file().unwrap_err().is_serialization());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_API_BASE_URL, "https://api.example"),
            (ENV_IDENTITY_API_KEY, "secret"),
            (ENV_DATA_DIR, "  "),
        ]);
        let config = apply_overrides(AppConfig::default(), |key| {
            env.get(key).map(|value| value.to_string())
        });

        assert_eq!(config.api.base_url, "https://api.example");
        assert_eq!(config.identity.api_key.as_deref(), Some("secret"));
        assert!(config.store.data_dir.is_none());
    }
}
