//! # pcloud-sync
//!
//! A thin, configuration-driven wrapper around `rclone` that mirrors
//! (`copy`, `sync`) or reconciles (`bisync`) local folders with a cloud
//! remote, by default `pcloud:`.
//!
//! All transfer semantics belong to rclone. This crate only validates the
//! requested options, builds the rclone command line and runs it, passing
//! rclone's exit code through.
//!
//! ## Core Modules
//!
//! - [`cli`] - Argument parsing and the run pipeline
//! - [`config`] - Option validation into a per-mode [`config::Configuration`]
//! - [`settings`] - Optional `config.toml` with default source/destination
//! - [`filters`] - Built-in and user exclude/include rules
//! - [`invocation`] - Argument building and subprocess execution
//! - [`error`] - Configuration errors and exit codes
//!
//! ## Quick Start
//!
//! ```bash
//! # Mirror ~/TradingHub to pcloud:TradingHub
//! pcloud-sync
//!
//! # First two-way run
//! pcloud-sync --mode bisync --resync
//!
//! # Nightly snapshot, preview only
//! pcloud-sync --mode copy --snapshot --name nightly --dry-run
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod filters;
pub mod invocation;
pub mod settings;

pub use config::{validate, Configuration, Mode, SyncOptions};
pub use error::ConfigError;
