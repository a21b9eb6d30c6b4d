//! # Settings File
//!
//! Optional `config.toml` holding the defaults used when flags are omitted:
//! which rclone binary to call, the zero-argument source/destination/mode,
//! and rclone's progress reporting. Without a file the built-in defaults
//! apply (`~/TradingHub` → `pcloud:TradingHub`, mode `sync`).
//!
//! The file lives in a platform-appropriate directory (e.g.
//! `~/.config/pcloud-sync/` on Linux). `--config-dir` or
//! `PCLOUD_SYNC_CONFIG_DIR` point somewhere else.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::ModeKind;
use crate::error::{ConfigError, Result};

pub const CONFIG_DIR_ENV: &str = "PCLOUD_SYNC_CONFIG_DIR";
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Program name or path of the sync engine.
    pub rclone_binary: String,
    pub default_sources: Vec<String>,
    pub default_destination: String,
    pub default_mode: ModeKind,
    /// Pass `-P --stats-one-line --stats <interval>` to rclone.
    pub progress: bool,
    pub stats_interval: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rclone_binary: "rclone".to_string(),
            default_sources: vec!["~/TradingHub".to_string()],
            default_destination: "pcloud:TradingHub".to_string(),
            default_mode: ModeKind::Sync,
            progress: true,
            stats_interval: "10s".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `dir` (or the default location). A missing file is
    /// not an error.
    pub async fn load(dir: Option<&Path>) -> Result<Self> {
        let path = Self::config_file(dir)?;
        Self::load_from(&path).await
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::SettingsIo {
                path: path.to_path_buf(),
                source,
            })?;
        let settings = toml::from_str(&content).map_err(|source| ConfigError::SettingsParse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Resolve the settings file path: `--config-dir`, then
    /// `PCLOUD_SYNC_CONFIG_DIR`, then the platform config directory.
    pub fn config_file(dir: Option<&Path>) -> Result<PathBuf> {
        Ok(Self::config_dir(dir)?.join(CONFIG_FILE_NAME))
    }

    fn config_dir(dir: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = dir {
            return Ok(dir.to_path_buf());
        }
        if let Some(env_dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(env_dir));
        }

        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("pcloud-sync");

        Ok(config_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serial_test::serial;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&temp_dir.path().join("config.toml"))
            .await
            .unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.default_mode, ModeKind::Sync);
        assert_eq!(settings.default_destination, "pcloud:TradingHub");
    }

    #[tokio::test]
    async fn test_partial_file_keeps_other_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        tokio::fs::write(
            &path,
            "rclone_binary = \"/opt/rclone/rclone\"\ndefault_mode = \"bisync\"\n",
        )
        .await
        .unwrap();

        let settings = Settings::load_from(&path).await.unwrap();

        assert_eq!(settings.rclone_binary, "/opt/rclone/rclone");
        assert_eq!(settings.default_mode, ModeKind::Bisync);
        assert_eq!(settings.default_sources, vec!["~/TradingHub".to_string()]);
        assert!(settings.progress);
    }

    #[tokio::test]
    async fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        tokio::fs::write(&path, "default_mode = \"mirror\"\n").await.unwrap();

        let result = Settings::load_from(&path).await;
        assert_matches!(result, Err(ConfigError::SettingsParse { .. }));
    }

    #[test]
    #[serial]
    fn test_explicit_dir_overrides_env() {
        let env_dir = TempDir::new().unwrap();
        std::env::set_var(CONFIG_DIR_ENV, env_dir.path());

        let explicit = Settings::config_file(Some(Path::new("/elsewhere"))).unwrap();
        let from_env = Settings::config_file(None).unwrap();

        std::env::remove_var(CONFIG_DIR_ENV);
        assert_eq!(explicit, PathBuf::from("/elsewhere/config.toml"));
        assert_eq!(from_env, env_dir.path().join(CONFIG_FILE_NAME));
    }

    #[test]
    #[serial]
    fn test_explicit_dir_used_without_env() {
        std::env::remove_var(CONFIG_DIR_ENV);
        let path = Settings::config_file(Some(Path::new("/etc/pcloud-sync"))).unwrap();
        assert_eq!(path, PathBuf::from("/etc/pcloud-sync/config.toml"));
    }
}
