//! Explorer configuration file.
//!
//! A small JSON file records defaults shared by every command: the runner base
//! URL, an extra directory of user templates, and a fixed layout seed. The
//! file lives in the standard configuration directory
//! (`~/.config/vlei/explorer.json` on most platforms) unless
//! `VLEI_CONFIG_PATH` points elsewhere. A missing file is not an error.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::expand_tilde;

/// Environment variable allowing callers to override the config file path.
pub const CONFIG_PATH_ENV: &str = "VLEI_CONFIG_PATH";

/// Default filename for the JSON payload.
pub const CONFIG_FILE_NAME: &str = "explorer.json";

/// Error surfaced when reading or writing the config file fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persisted explorer defaults.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Base URL of the workflow runner service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runner_url: Option<String>,
    /// Directory scanned for additional `*.json` templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<String>,
    /// Seed for layout jitter; absent means fresh entropy per derivation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_seed: Option<u64>,
}

impl ExplorerConfig {
    /// Loads the config from the default location, falling back to defaults when
    /// the file is missing or malformed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&default_config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(config) => Ok(config),
                Err(error) => {
                    warn!(
                        target: "vlei_config",
                        path = %path.display(),
                        error = %error,
                        "Failed to parse explorer config; using defaults"
                    );
                    Ok(Self::default())
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(ConfigError::Io(error)),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Templates directory with `~` expanded.
    pub fn templates_path(&self) -> Option<PathBuf> {
        self.templates_dir
            .as_deref()
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
            .map(expand_tilde)
    }
}

/// Resolves the config file path from `VLEI_CONFIG_PATH` or the platform config dir.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    config_dir().unwrap_or_else(|| PathBuf::from(".")).join("vlei").join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn env_override_wins() {
        temp_env::with_var(CONFIG_PATH_ENV, Some("/tmp/vlei-test/explorer.json"), || {
            assert_eq!(default_config_path(), PathBuf::from("/tmp/vlei-test/explorer.json"));
        });
    }

    #[test]
    fn blank_override_falls_back_to_config_dir() {
        temp_env::with_var(CONFIG_PATH_ENV, Some("   "), || {
            let path = default_config_path();
            assert!(path.ends_with(Path::new("vlei").join(CONFIG_FILE_NAME)));
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().expect("tempdir");
        let config = ExplorerConfig::load_from(&dir.path().join("absent.json")).expect("load");
        assert_eq!(config, ExplorerConfig::default());
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ not json").expect("write");
        assert_eq!(ExplorerConfig::load_from(&path).expect("load"), ExplorerConfig::default());
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let config = ExplorerConfig {
            runner_url: Some("http://runner:3001".into()),
            templates_dir: Some("~/vlei-templates".into()),
            layout_seed: Some(7),
        };
        config.save_to(&path).expect("save");

        let loaded = ExplorerConfig::load_from(&path).expect("load");
        assert_eq!(loaded, config);
        assert!(!loaded.templates_path().expect("templates path").starts_with("~"));
    }
}
