//! # Error Types
//!
//! Failures that are detected before rclone is ever started. Anything that
//! goes wrong after dispatch is either rclone's own exit code (passed through
//! untouched) or an `anyhow::Error` carrying context.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ModeKind;

/// Exit code used when the run is refused before any subprocess is launched.
pub const CONFIG_ERROR_EXIT: u8 = 2;

/// Exit code reported when the user interrupts a running transfer.
pub const INTERRUPTED_EXIT: i32 = 130;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("at least one --src directory is required")]
    NoSources,

    #[error("destination '{0}' is not of the form remote:path")]
    MalformedDestination(String),

    #[error("--{option} is only valid with --mode {allowed}, not --mode {mode}")]
    IncompatibleOption {
        option: &'static str,
        allowed: &'static str,
        mode: ModeKind,
    },

    #[error("--name must not be empty")]
    EmptyName,

    #[error("could not determine the home directory to expand '{0}'")]
    HomeDirUnavailable(String),

    #[error("source '{}' has no final path component to nest under the destination", .0.display())]
    UnnamedSource(PathBuf),

    #[error("several sources would write to the same location {0}; give each source a distinct folder name")]
    DuplicateDestination(String),

    #[error("source not found or not a directory: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("cannot create local target directory {}: {source}", .path.display())]
    CreateTarget {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{binary} not found. Install it first (e.g. `sudo apt-get install rclone`)")]
    BinaryNotFound {
        binary: String,
        #[source]
        source: which::Error,
    },

    #[error("could not read settings file {}: {source}", .path.display())]
    SettingsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {}: {source}", .path.display())]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("could not determine config directory")]
    NoConfigDir,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incompatible_option_message() {
        let err = ConfigError::IncompatibleOption {
            option: "resync",
            allowed: "bisync",
            mode: ModeKind::Copy,
        };
        assert_eq!(
            err.to_string(),
            "--resync is only valid with --mode bisync, not --mode copy"
        );
    }

    #[test]
    fn test_missing_source_message() {
        let err = ConfigError::MissingSource(PathBuf::from("/nope"));
        assert!(err.to_string().contains("/nope"));
    }
}
