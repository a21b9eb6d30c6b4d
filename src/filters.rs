//! # Filter Rules
//!
//! Builds the ordered `--exclude` / `--include` rules handed to rclone.
//! The built-in excludes keep version-control metadata, virtualenvs and
//! Python bytecode caches off the remote. User rules only ever extend the
//! list. How overlapping excludes and includes are resolved is up to rclone.

/// Patterns excluded unless `--no-default-excludes` is given.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "/**/.git/**",
    "/**/.venv/**",
    "/**/venv/**",
    "/**/__pycache__/**",
    "/**/.mypy_cache/**",
    "/**/.pytest_cache/**",
    "/**/*.pyc",
    "/**/*.pyo",
];

/// A single rclone filter rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterRule {
    Exclude(String),
    Include(String),
}

impl FilterRule {
    pub fn flag(&self) -> &'static str {
        match self {
            FilterRule::Exclude(_) => "--exclude",
            FilterRule::Include(_) => "--include",
        }
    }

    pub fn pattern(&self) -> &str {
        match self {
            FilterRule::Exclude(p) | FilterRule::Include(p) => p,
        }
    }
}

/// Build the rule list: defaults (unless disabled), then user excludes in
/// the order given, then user includes in the order given.
pub fn build_exclude_rules(
    use_defaults: bool,
    excludes: &[String],
    includes: &[String],
) -> Vec<FilterRule> {
    let defaults: &[&str] = if use_defaults { DEFAULT_EXCLUDES } else { &[] };

    defaults
        .iter()
        .map(|p| FilterRule::Exclude((*p).to_string()))
        .chain(excludes.iter().cloned().map(FilterRule::Exclude))
        .chain(includes.iter().cloned().map(FilterRule::Include))
        .collect()
}

/// Flatten rules into `flag pattern` argument pairs.
pub fn to_args(rules: &[FilterRule]) -> Vec<String> {
    rules
        .iter()
        .flat_map(|rule| [rule.flag().to_string(), rule.pattern().to_string()])
        .collect()
}
