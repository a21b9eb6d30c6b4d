//! # Command Line Interface
//!
//! Argument parsing and the single linear run: load settings, validate,
//! build the rclone invocations, check them locally, then execute.
//!
//! Running with no arguments is the same as
//! `--src ~/TradingHub --dest pcloud:TradingHub --mode sync` (unless the
//! settings file says otherwise).

use anyhow::Result;
use chrono::Local;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::{validate, ConflictResolve, Direction, ModeKind, SyncOptions};
use crate::error::INTERRUPTED_EXIT;
use crate::invocation::{self, Invocation};
use crate::settings::Settings;

/// Command-line interface for pcloud-sync.
#[derive(Parser, Debug)]
#[command(name = "pcloud-sync")]
#[command(about = "Mirror or bisync local folders with a pCloud remote through rclone (copy/sync/bisync)")]
#[command(version)]
pub struct Cli {
    /// Source directory (repeatable). Default: ~/TradingHub
    #[arg(long = "src", value_name = "PATH", num_args = 1.., action = ArgAction::Append)]
    pub sources: Vec<String>,

    /// Destination as remote:path. Default: pcloud:TradingHub
    #[arg(long = "dest", value_name = "REMOTE:PATH")]
    pub destination: Option<String>,

    /// Transfer mode. Default: sync
    #[arg(long, value_enum)]
    pub mode: Option<ModeKind>,

    /// Flip direction: remote -> local
    #[arg(long, visible_alias = "pull")]
    pub reverse: bool,

    /// Do not modify anything, just show what would happen
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Pass --fast-list to rclone
    #[arg(long, visible_alias = "fast-list")]
    pub fast: bool,

    /// Increase rclone verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable the built-in exclude rules
    #[arg(long)]
    pub no_default_excludes: bool,

    /// Additional exclude pattern (repeatable)
    #[arg(long, value_name = "PATTERN", action = ArgAction::Append)]
    pub exclude: Vec<String>,

    /// Additional include pattern (repeatable)
    #[arg(long, value_name = "PATTERN", action = ArgAction::Append)]
    pub include: Vec<String>,

    /// copy/sync only: write into a snapshot subfolder (--name or a timestamp)
    #[arg(long)]
    pub snapshot: bool,

    /// Subfolder on the destination, or the snapshot folder name
    #[arg(long, value_name = "SUBDIR")]
    pub name: Option<String>,

    /// bisync only: rebuild the baseline (use once on the first run)
    #[arg(long)]
    pub resync: bool,

    /// bisync only: conflict policy. Default: newer
    #[arg(long, value_enum, value_name = "POLICY")]
    pub conflict_resolve: Option<ConflictResolve>,

    /// Run `rclone about remote:` before transferring
    #[arg(long)]
    pub check_remote: bool,

    /// Directory holding config.toml
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

impl Cli {
    /// Flatten the parsed flags into [`SyncOptions`], filling omitted
    /// source, destination and mode from `settings`.
    pub fn into_options(self, settings: &Settings) -> SyncOptions {
        let sources = if self.sources.is_empty() {
            settings.default_sources.clone()
        } else {
            self.sources
        };

        SyncOptions {
            sources,
            destination: self
                .destination
                .unwrap_or_else(|| settings.default_destination.clone()),
            mode: Some(self.mode.unwrap_or(settings.default_mode)),
            direction: if self.reverse {
                Direction::Pull
            } else {
                Direction::Push
            },
            dry_run: self.dry_run,
            fast_list: self.fast,
            verbosity: self.verbose,
            no_default_excludes: self.no_default_excludes,
            excludes: self.exclude,
            includes: self.include,
            snapshot: self.snapshot,
            name: self.name,
            resync: self.resync,
            conflict_resolve: self.conflict_resolve,
            check_remote: self.check_remote,
        }
    }
}

/// Run the whole pipeline and return the exit code to report.
///
/// Configuration problems come back as `ConfigError` inside the
/// `anyhow::Error` before anything is dispatched. Otherwise the result is
/// the first non-zero rclone exit code, or 0.
pub async fn run(cli: Cli) -> Result<i32> {
    let settings = Settings::load(cli.config_dir.as_deref()).await?;
    debug!("Using settings: {:?}", settings);

    let options = cli.into_options(&settings);
    let config = validate(options, Local::now())?;
    info!(
        "Running {} ({}) for {} source(s)",
        config.mode.kind(),
        config.direction,
        config.sources.len()
    );

    let program = invocation::locate_binary(&settings.rclone_binary)?;
    let invocations = invocation::build_invocations(&config, &settings, &program)?;
    invocation::preflight(&config, &invocations)?;

    if config.check_remote {
        invocation::check_remote(&program, &config.destination).await?;
    }

    let mut exit = 0;
    for invocation in &invocations {
        print_header(config.mode.kind(), config.direction, invocation);

        let code = invocation::execute(invocation).await?;
        let (source, destination) = (
            invocation.transfer.source.to_arg(),
            invocation.transfer.destination.to_arg(),
        );

        if code == 0 {
            println!("✅ Done: {} → {}\n", source, destination);
        } else {
            eprintln!("❌ Failed (rc={}): {} → {}\n", code, source, destination);
            if exit == 0 {
                exit = code;
            }
        }

        if code == INTERRUPTED_EXIT {
            break;
        }
    }

    Ok(exit)
}

fn print_header(mode: ModeKind, direction: Direction, invocation: &Invocation) {
    println!(
        "\n=== {} ({}) ===\nSource : {}\nDest   : {}\n",
        mode.subcommand().to_uppercase(),
        direction,
        invocation.transfer.source.to_arg(),
        invocation.transfer.destination.to_arg(),
    );
}
