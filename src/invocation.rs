//! # rclone Invocations
//!
//! Plans the transfers for a [`Configuration`], renders each one as an
//! rclone argument list, and runs it. rclone accepts one source and one
//! destination per call, so every `--src` becomes its own transfer; with a
//! single source exactly one subprocess is started.
//!
//! Nothing here interprets rclone's behaviour. Output is streamed straight
//! through and the exit code is returned unmodified.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::{Configuration, Direction, Mode, Remote};
use crate::error::{ConfigError, INTERRUPTED_EXIT};
use crate::filters;
use crate::settings::Settings;

/// One end of a transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Local(PathBuf),
    Remote(Remote),
}

impl Endpoint {
    pub fn to_arg(&self) -> String {
        match self {
            Endpoint::Local(path) => path.to_string_lossy().into_owned(),
            Endpoint::Remote(remote) => remote.to_string(),
        }
    }
}

/// A single source/destination pair to hand to rclone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    /// The local tree, as given on the command line.
    pub local: PathBuf,
    pub source: Endpoint,
    pub destination: Endpoint,
}

impl Transfer {
    /// The local directory rclone writes into, if any.
    pub fn local_target(&self) -> Option<&Path> {
        match &self.destination {
            Endpoint::Local(path) => Some(path),
            Endpoint::Remote(_) => None,
        }
    }
}

/// A fully rendered command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub transfer: Transfer,
}

impl Invocation {
    /// The command as echoed to the user before running it.
    pub fn display(&self) -> String {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Resolve the two endpoints of every transfer.
///
/// The remote side is nested under `--name` (without `--snapshot`) or, for
/// several sources, under each source's folder name. A snapshot directory
/// is appended to whichever side is written to. bisync always takes the
/// local tree as path1 so path1/path2 conflict policies keep their meaning.
///
/// Two transfers writing to the same location are refused: a later sync or
/// bisync would delete what the earlier one uploaded.
pub fn plan(config: &Configuration) -> Result<Vec<Transfer>, ConfigError> {
    let transfers = config
        .sources
        .iter()
        .map(|local| -> Result<Transfer, ConfigError> {
            let nest = match (&config.subdir, config.is_multi_source()) {
                (Some(name), _) => Some(name.clone()),
                (None, true) => Some(source_name(local)?),
                (None, false) => None,
            };

            let remote = match &nest {
                Some(segment) => config.destination.join(segment),
                None => config.destination.clone(),
            };

            let snapshot = config.mode.snapshot();
            let (source, destination) = match (&config.mode, config.direction) {
                (Mode::Bisync(_), _) => (Endpoint::Local(local.clone()), Endpoint::Remote(remote)),
                (_, Direction::Push) => {
                    let remote = match snapshot {
                        Some(dir) => remote.join(dir),
                        None => remote,
                    };
                    (Endpoint::Local(local.clone()), Endpoint::Remote(remote))
                }
                (_, Direction::Pull) => {
                    let target = match snapshot {
                        Some(dir) => local.join(dir),
                        None => local.clone(),
                    };
                    (Endpoint::Remote(remote), Endpoint::Local(target))
                }
            };

            Ok(Transfer {
                local: local.clone(),
                source,
                destination,
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let mut written = HashSet::new();
    for transfer in &transfers {
        let mut targets = vec![&transfer.destination];
        if matches!(config.mode, Mode::Bisync(_)) {
            targets.push(&transfer.source);
        }
        for target in targets {
            let target = target.to_arg();
            if !written.insert(target.clone()) {
                return Err(ConfigError::DuplicateDestination(target));
            }
        }
    }

    Ok(transfers)
}

/// Folder name used to nest a source on the remote. Paths like `.` or
/// `foo/..` have no final component until resolved.
fn source_name(path: &Path) -> Result<String, ConfigError> {
    let resolved;
    let path = match path.file_name() {
        Some(_) => path,
        None => {
            resolved = std::fs::canonicalize(path)
                .map_err(|_| ConfigError::UnnamedSource(path.to_path_buf()))?;
            resolved.as_path()
        }
    };

    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| ConfigError::UnnamedSource(path.to_path_buf()))
}

/// Render the rclone arguments for one transfer. Identical inputs always
/// produce identical argument lists.
pub fn build_arguments(config: &Configuration, transfer: &Transfer, settings: &Settings) -> Vec<String> {
    let mut args = vec![
        config.mode.kind().subcommand().to_string(),
        transfer.source.to_arg(),
        transfer.destination.to_arg(),
    ];

    match &config.mode {
        Mode::Copy(_) | Mode::Sync(_) => {
            args.push("--create-empty-src-dirs".to_string());
        }
        Mode::Bisync(two_way) => {
            if two_way.resync {
                args.push("--resync".to_string());
            }
            args.extend(
                [
                    "--conflict-resolve",
                    two_way.conflict_resolve.as_str(),
                    "--check-access",
                    "--compare",
                    "size,modtime",
                    "--create-empty-src-dirs",
                    "--resilient",
                    "--recover",
                ]
                .map(String::from),
            );
        }
    }

    if config.dry_run {
        args.push("--dry-run".to_string());
    }
    if config.fast_list {
        args.push("--fast-list".to_string());
    }
    args.extend(std::iter::repeat("-v".to_string()).take(usize::from(config.verbosity)));

    if settings.progress {
        args.extend([
            "-P".to_string(),
            "--stats-one-line".to_string(),
            "--stats".to_string(),
            settings.stats_interval.clone(),
        ]);
    }

    args.extend(filters::to_args(&config.filters));
    args
}

/// Plan and render every invocation for `config`.
pub fn build_invocations(
    config: &Configuration,
    settings: &Settings,
    program: &Path,
) -> Result<Vec<Invocation>, ConfigError> {
    Ok(plan(config)?
        .into_iter()
        .map(|transfer| Invocation {
            program: program.to_path_buf(),
            args: build_arguments(config, &transfer, settings),
            transfer,
        })
        .collect())
}

/// Find the rclone binary, either an explicit path or a name on PATH.
pub fn locate_binary(binary: &str) -> Result<PathBuf, ConfigError> {
    which::which(binary).map_err(|source| ConfigError::BinaryNotFound {
        binary: binary.to_string(),
        source,
    })
}

/// Local checks done before anything is dispatched. Pushed sources must be
/// existing directories; pulled-into directories are created unless this is
/// a dry run.
pub fn preflight(config: &Configuration, invocations: &[Invocation]) -> Result<(), ConfigError> {
    for invocation in invocations {
        let transfer = &invocation.transfer;

        match (config.direction, transfer.local_target()) {
            (Direction::Pull, Some(target)) if !matches!(config.mode, Mode::Bisync(_)) => {
                if !config.dry_run && !target.is_dir() {
                    std::fs::create_dir_all(target).map_err(|source| ConfigError::CreateTarget {
                        path: target.to_path_buf(),
                        source,
                    })?;
                    info!("Created local target directory: {}", target.display());
                }
            }
            _ => {
                if !transfer.local.is_dir() {
                    return Err(ConfigError::MissingSource(transfer.local.clone()));
                }
            }
        }
    }

    Ok(())
}

/// Run `rclone about remote:` as a reachability check. The result is only
/// reported, never acted on.
pub async fn check_remote(program: &Path, remote: &Remote) -> Result<()> {
    let root = remote.root();
    println!("$ {} about {}", program.display(), root);

    let status = Command::new(program)
        .arg("about")
        .arg(&root)
        .status()
        .await
        .with_context(|| format!("Failed to start {}", program.display()))?;

    if !status.success() {
        warn!("Remote check for {} exited with {}", root, status);
    }
    Ok(())
}

/// Run one invocation with inherited stdio and return its exit code as is.
/// Ctrl-C while waiting yields 130; the child receives the same signal from
/// the terminal and is awaited before returning.
pub async fn execute(invocation: &Invocation) -> Result<i32> {
    println!("$ {}", invocation.display());
    debug!("Spawning {:?} with {} arguments", invocation.program, invocation.args.len());

    let mut child = Command::new(&invocation.program)
        .args(&invocation.args)
        .spawn()
        .with_context(|| format!("Failed to start {}", invocation.program.display()))?;

    tokio::select! {
        status = child.wait() => {
            let status = status.context("Failed to wait for rclone")?;
            Ok(exit_code(status))
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, waiting for rclone to exit");
            let _ = child.wait().await;
            Ok(INTERRUPTED_EXIT)
        }
    }
}

/// Map a child's exit status to the code this process should exit with.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
