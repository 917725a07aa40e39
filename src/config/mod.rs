use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::core::ExportError;

/// Date format accepted for `--from` / `--to`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which table a run exports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    Payments,
    History,
}

impl ExportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportMode::Payments => "payments",
            ExportMode::History => "hashrate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

/// Everything one run needs, resolved up front and never mutated
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub addr: String,
    /// First day exported (inclusive, UTC midnight)
    pub from: NaiveDate,
    /// First day not exported (exclusive, UTC midnight)
    pub to: NaiveDate,
    pub mode: ExportMode,
    pub output: OutputTarget,
    pub api_url: String,
    pub timeout: Duration,
}

impl ExportConfig {
    /// Unix seconds of `from` at 00:00 UTC
    pub fn since_ts(&self) -> i64 {
        day_start(self.from)
    }

    /// Unix seconds of `to` at 00:00 UTC
    pub fn until_ts(&self) -> i64 {
        day_start(self.to)
    }
}

/// Settings read from the optional config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub output_dir: Option<PathBuf>,
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate, ExportError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| ExportError::Argument(format!("invalid date {value:?}, want YYYY-MM-DD: {e}")))
}

pub fn day_start(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Load settings from the first config file found.
///
/// A missing file means defaults; a file that exists but cannot be read or
/// parsed is an error.
pub fn load() -> Result<Settings, ExportError> {
    match config_path() {
        Some(path) if path.exists() => load_from(&path),
        _ => Ok(Settings::default()),
    }
}

pub fn load_from(path: &Path) -> Result<Settings, ExportError> {
    let content = fs::read_to_string(path)
        .map_err(|e| ExportError::Config(format!("read {}: {}", path.display(), e)))?;
    toml::from_str::<Settings>(&content)
        .map_err(|e| ExportError::Config(format!("parse {}: {}", path.display(), e)))
}

/// Settings file location: `$NHEXPORT_CONFIG`, then `nhexport/config.toml`
/// under the user's config directory.
pub fn config_path() -> Option<PathBuf> {
    config_path_with(|key| std::env::var_os(key))
}

fn config_path_with<F>(var: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<OsString>,
{
    const APP_DIR: &str = "nhexport";
    const FILE_NAME: &str = "config.toml";

    let set = |key: &str| var(key).filter(|value| !value.is_empty()).map(PathBuf::from);

    if let Some(path) = set("NHEXPORT_CONFIG") {
        return Some(path);
    }

    let config_dir = set("XDG_CONFIG_HOME")
        .or_else(|| set("HOME").map(|home| home.join(".config")))
        .or_else(|| {
            directories::BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf())
        })?;
    Some(config_dir.join(APP_DIR).join(FILE_NAME))
}
