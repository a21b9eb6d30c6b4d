//! # Run Configuration
//!
//! Turns the flat option record collected from the command line into a
//! validated [`Configuration`]. Options that only make sense for some modes
//! live inside the [`Mode`] variant they belong to, so a `Configuration`
//! with `--resync` on a `copy`, or a snapshot on a `bisync`, cannot exist.

use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::filters::{self, FilterRule};

/// Format of timestamped snapshot directories (ISO-8601 basic format).
pub const SNAPSHOT_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Highest verbosity forwarded to rclone.
pub const MAX_VERBOSITY: u8 = 3;

/// Transfer mode as named on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    /// One-way transfer of new and changed files, no deletions
    Copy,
    /// One-way mirror, deletes extraneous files on the destination
    Sync,
    /// Two-way reconciliation against a stored baseline
    Bisync,
}

impl ModeKind {
    /// The rclone subcommand for this mode.
    pub fn subcommand(self) -> &'static str {
        match self {
            ModeKind::Copy => "copy",
            ModeKind::Sync => "sync",
            ModeKind::Bisync => "bisync",
        }
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subcommand())
    }
}

/// bisync conflict policy, forwarded as `--conflict-resolve`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ConflictResolve {
    None,
    #[default]
    Newer,
    Older,
    Path1,
    Path2,
    Larger,
    Smaller,
}

impl ConflictResolve {
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictResolve::None => "none",
            ConflictResolve::Newer => "newer",
            ConflictResolve::Older => "older",
            ConflictResolve::Path1 => "path1",
            ConflictResolve::Path2 => "path2",
            ConflictResolve::Larger => "larger",
            ConflictResolve::Smaller => "smaller",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    /// local -> remote
    #[default]
    Push,
    /// remote -> local
    Pull,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Push => f.write_str("local -> remote"),
            Direction::Pull => f.write_str("remote -> local"),
        }
    }
}

/// Options exactly as collected from the command line, before validation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SyncOptions {
    pub sources: Vec<String>,
    pub destination: String,
    pub mode: Option<ModeKind>,
    pub direction: Direction,
    pub dry_run: bool,
    pub fast_list: bool,
    pub verbosity: u8,
    pub no_default_excludes: bool,
    pub excludes: Vec<String>,
    pub includes: Vec<String>,
    pub snapshot: bool,
    pub name: Option<String>,
    pub resync: bool,
    pub conflict_resolve: Option<ConflictResolve>,
    pub check_remote: bool,
}

/// A `remote:path` destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Remote {
    name: String,
    path: String,
}

impl Remote {
    pub fn parse(value: &str) -> Result<Self> {
        let malformed = || ConfigError::MalformedDestination(value.to_string());

        let (name, path) = value.split_once(':').ok_or_else(malformed)?;
        if name.trim().is_empty() || name.contains(['/', '\\']) {
            return Err(malformed());
        }

        // `remote:/` (backend root) and `remote:` (home) differ, keep a lone slash.
        let trimmed = path.trim_end_matches('/');
        let path = if trimmed.is_empty() && !path.is_empty() {
            "/"
        } else {
            trimmed
        };

        Ok(Self {
            name: name.to_string(),
            path: path.to_string(),
        })
    }

    /// Remote name without the trailing colon.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Remote root, e.g. `pcloud:`, as accepted by `rclone about`.
    pub fn root(&self) -> String {
        format!("{}:", self.name)
    }

    /// Append a subdirectory.
    pub fn join(&self, segment: &str) -> Self {
        let segment = segment.trim_matches('/');
        let path = if self.path.is_empty() || self.path.ends_with('/') {
            format!("{}{}", self.path, segment)
        } else {
            format!("{}/{}", self.path, segment)
        };
        Self {
            name: self.name.clone(),
            path,
        }
    }
}

impl fmt::Display for Remote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.path)
    }
}

/// Options of the one-way modes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OneWay {
    /// Resolved snapshot subdirectory, if requested.
    pub snapshot: Option<String>,
}

/// Options of bisync.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TwoWay {
    pub resync: bool,
    pub conflict_resolve: ConflictResolve,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Copy(OneWay),
    Sync(OneWay),
    Bisync(TwoWay),
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Copy(_) => ModeKind::Copy,
            Mode::Sync(_) => ModeKind::Sync,
            Mode::Bisync(_) => ModeKind::Bisync,
        }
    }

    pub fn snapshot(&self) -> Option<&str> {
        match self {
            Mode::Copy(one_way) | Mode::Sync(one_way) => one_way.snapshot.as_deref(),
            Mode::Bisync(_) => None,
        }
    }
}

/// A validated run configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Configuration {
    pub sources: Vec<PathBuf>,
    pub destination: Remote,
    pub mode: Mode,
    pub direction: Direction,
    /// `--name` without `--snapshot`: nest the remote side under this folder.
    pub subdir: Option<String>,
    pub filters: Vec<FilterRule>,
    pub dry_run: bool,
    pub fast_list: bool,
    pub verbosity: u8,
    pub check_remote: bool,
}

impl Configuration {
    pub fn is_multi_source(&self) -> bool {
        self.sources.len() > 1
    }
}

/// Validate raw options into a [`Configuration`].
///
/// `now` is only consulted when a snapshot without `--name` needs a
/// timestamped directory; everything downstream is deterministic.
pub fn validate(options: SyncOptions, now: DateTime<Local>) -> Result<Configuration> {
    if options.sources.is_empty() {
        return Err(ConfigError::NoSources);
    }

    let destination = Remote::parse(&options.destination)?;
    let kind = options.mode.unwrap_or(ModeKind::Sync);

    let name = match options.name {
        Some(name) => {
            let name = name.trim_matches('/').to_string();
            if name.is_empty() {
                return Err(ConfigError::EmptyName);
            }
            Some(name)
        }
        None => None,
    };

    let incompatible = |option: &'static str, allowed: &'static str| {
        ConfigError::IncompatibleOption {
            option,
            allowed,
            mode: kind,
        }
    };

    let (mode, subdir) = match kind {
        ModeKind::Copy | ModeKind::Sync => {
            if options.resync {
                return Err(incompatible("resync", "bisync"));
            }
            if options.conflict_resolve.is_some() {
                return Err(incompatible("conflict-resolve", "bisync"));
            }

            let (snapshot, subdir) = if options.snapshot {
                let dir = name.unwrap_or_else(|| snapshot_timestamp(now));
                (Some(dir), None)
            } else {
                (None, name)
            };

            let one_way = OneWay { snapshot };
            let mode = if kind == ModeKind::Copy {
                Mode::Copy(one_way)
            } else {
                Mode::Sync(one_way)
            };
            (mode, subdir)
        }
        ModeKind::Bisync => {
            if options.snapshot {
                return Err(incompatible("snapshot", "copy or sync"));
            }
            let two_way = TwoWay {
                resync: options.resync,
                conflict_resolve: options.conflict_resolve.unwrap_or_default(),
            };
            (Mode::Bisync(two_way), name)
        }
    };

    let sources = options
        .sources
        .iter()
        .map(|s| expand_tilde(s))
        .collect::<Result<Vec<_>>>()?;

    let filters = filters::build_exclude_rules(
        !options.no_default_excludes,
        &options.excludes,
        &options.includes,
    );

    Ok(Configuration {
        sources,
        destination,
        mode,
        direction: options.direction,
        subdir,
        filters,
        dry_run: options.dry_run,
        fast_list: options.fast_list,
        verbosity: options.verbosity.min(MAX_VERBOSITY),
        check_remote: options.check_remote,
    })
}

/// Name of a timestamped snapshot directory.
pub fn snapshot_timestamp(now: DateTime<Local>) -> String {
    now.format(SNAPSHOT_TIMESTAMP_FORMAT).to_string()
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with(['/', '\\']) => rest,
        _ => return Ok(PathBuf::from(path)),
    };

    let home =
        dirs::home_dir().ok_or_else(|| ConfigError::HomeDirUnavailable(path.to_string()))?;
    let rest = rest.trim_start_matches(['/', '\\']);

    Ok(if rest.is_empty() { home } else { home.join(rest) })
}
