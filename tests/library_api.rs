//! Integration tests for the library API: options in, rclone arguments out.

use chrono::{Local, TimeZone};
use pcloud_sync::config::{ConflictResolve, ModeKind};
use pcloud_sync::filters::DEFAULT_EXCLUDES;
use pcloud_sync::invocation::build_invocations;
use pcloud_sync::settings::Settings;
use pcloud_sync::{validate, ConfigError, SyncOptions};
use std::path::Path;

fn arguments(options: SyncOptions) -> Vec<String> {
    let now = Local.with_ymd_and_hms(2025, 6, 30, 22, 15, 0).unwrap();
    let config = validate(options, now).unwrap();
    let settings = Settings {
        progress: false,
        ..Settings::default()
    };
    build_invocations(&config, &settings, Path::new("rclone"))
        .unwrap()
        .remove(0)
        .args
}

fn base(mode: ModeKind) -> SyncOptions {
    SyncOptions {
        sources: vec!["/home/trader/TradingHub".to_string()],
        destination: "pcloud:TradingHub".to_string(),
        mode: Some(mode),
        ..Default::default()
    }
}

#[test]
fn test_snapshot_timestamp_is_deterministic_for_fixed_clock() {
    let mut options = base(ModeKind::Sync);
    options.snapshot = true;

    let args = arguments(options.clone());
    assert_eq!(args[2], "pcloud:TradingHub/20250630T221500");
    assert_eq!(args, arguments(options));
}

#[test]
fn test_bisync_full_command() {
    let mut options = base(ModeKind::Bisync);
    options.conflict_resolve = Some(ConflictResolve::Larger);
    options.fast_list = true;
    options.includes = vec!["keep/**".to_string()];

    let args = arguments(options);
    assert_eq!(args[0], "bisync");
    assert!(!args.contains(&"--resync".to_string()));
    assert!(args.windows(2).any(|w| w == ["--conflict-resolve", "larger"]));
    assert!(args.contains(&"--fast-list".to_string()));
    assert_eq!(&args[args.len() - 2..], ["--include", "keep/**"]);

    let excludes = args.iter().filter(|a| *a == "--exclude").count();
    assert_eq!(excludes, DEFAULT_EXCLUDES.len());
}

#[test]
fn test_incompatible_options_rejected() {
    let now = Local::now();

    let mut options = base(ModeKind::Copy);
    options.resync = true;
    assert!(matches!(
        validate(options, now),
        Err(ConfigError::IncompatibleOption { .. })
    ));

    let mut options = base(ModeKind::Bisync);
    options.snapshot = true;
    assert!(matches!(
        validate(options, now),
        Err(ConfigError::IncompatibleOption { .. })
    ));
}
