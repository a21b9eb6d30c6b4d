//! # pcloud-sync
//!
//! Entry point: sets up logging, parses the command line and hands off to
//! [`cli::run`]. rclone's exit code becomes this process's exit code; local
//! configuration problems exit with code 2 before rclone is started.

use clap::Parser;
use colored::*;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pcloud_sync::cli::{self, Cli};
use pcloud_sync::error::{ConfigError, CONFIG_ERROR_EXIT};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("pcloud_sync={}", level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli::run(cli).await {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!(
                "{} {}\n{}",
                "Error:".red().bold(),
                format!("{:#}", e).red(),
                "Tip: Run with --help for usage information.".yellow()
            );
            if e.downcast_ref::<ConfigError>().is_some() {
                ExitCode::from(CONFIG_ERROR_EXIT)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
