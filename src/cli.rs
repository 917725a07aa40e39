//! Command-line arguments
//!
//! Flags may be given in GNU form (`--addr X`) or in the single-dash form
//! older scripts use (`-addr X`, `-payments`); the latter are rewritten
//! before clap sees them.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use clap::builder::NonEmptyStringValueParser;
use clap::Parser;
use tracing::warn;

use crate::config::{self, ExportConfig, ExportMode, OutputTarget, Settings, DATE_FORMAT};
use crate::core::ExportError;
use crate::infrastructure::nicehash::{DEFAULT_API_URL, DEFAULT_TIMEOUT};
use crate::modules::export::default_file_name;

/// Long flags that are also accepted with a single dash
const LONG_FLAGS: &[&str] = &[
    "addr", "from", "to", "payments", "output", "api-url", "timeout", "quiet", "verbose",
];

/// Export mining pool payouts or hashrate history to CSV
#[derive(Debug, Parser)]
#[command(name = "nhexport", version)]
pub struct Args {
    /// Your payout address (mandatory)
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub addr: String,

    /// Begin date, inclusive (YYYY-MM-DD, default: yesterday UTC)
    #[arg(long, value_parser = parse_date_arg)]
    pub from: Option<NaiveDate>,

    /// End date, exclusive (YYYY-MM-DD, default: today UTC)
    #[arg(long, value_parser = parse_date_arg)]
    pub to: Option<NaiveDate>,

    /// Export payments instead of hashrate + history
    #[arg(long)]
    pub payments: bool,

    /// Output file, `-` for stdout (default: {from}-{to}-{addr}-{mode}.csv)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Base URL of the stats API
    #[arg(long)]
    pub api_url: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Only log warnings and errors
    #[arg(long, short, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log request details
    #[arg(long, short)]
    pub verbose: bool,
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    config::parse_date(value).map_err(|e| e.to_string())
}

/// Rewrite `-flag` / `-flag=value` to `--flag` for the known long flags
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut out = Vec::new();
    let mut passthrough = false;

    for (i, arg) in args.into_iter().map(Into::into).enumerate() {
        if i == 0 || passthrough {
            out.push(arg);
            continue;
        }
        let Some(text) = arg.to_str() else {
            out.push(arg);
            continue;
        };
        if text == "--" {
            passthrough = true;
            out.push(arg);
            continue;
        }

        let rewritten = text
            .strip_prefix('-')
            .filter(|rest| !rest.starts_with('-'))
            .filter(|rest| {
                let name = rest.split_once('=').map_or(*rest, |(name, _)| name);
                LONG_FLAGS.contains(&name)
            })
            .map(|rest| OsString::from(format!("--{rest}")));

        out.push(rewritten.unwrap_or(arg));
    }

    out
}

impl Args {
    pub fn mode(&self) -> ExportMode {
        if self.payments {
            ExportMode::Payments
        } else {
            ExportMode::History
        }
    }

    /// Resolve flags, config file and defaults into one run configuration.
    ///
    /// `today` is the UTC date at process start.
    pub fn into_config(
        self,
        settings: Settings,
        today: NaiveDate,
    ) -> Result<ExportConfig, ExportError> {
        let mode = self.mode();
        let from = match self.from {
            Some(date) => date,
            None => today.pred_opt().ok_or_else(|| {
                ExportError::Argument(format!("no day before {today}"))
            })?,
        };
        let to = self.to.unwrap_or(today);
        if from >= to {
            warn!(%from, %to, "date range is empty, only the header will be written");
        }

        let output = match self.output {
            Some(path) if path.as_os_str() == "-" => OutputTarget::Stdout,
            Some(path) => OutputTarget::File(path),
            None => {
                let name = default_file_name(
                    &from.format(DATE_FORMAT).to_string(),
                    &to.format(DATE_FORMAT).to_string(),
                    &self.addr,
                    mode,
                );
                let dir = settings.output_dir.unwrap_or_default();
                OutputTarget::File(dir.join(name))
            }
        };

        let timeout = match self.timeout.or(settings.timeout_secs) {
            Some(0) => {
                return Err(ExportError::Config("timeout must be at least 1 second".into()))
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_TIMEOUT,
        };

        let api_url = self
            .api_url
            .or(settings.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(ExportConfig {
            addr: self.addr,
            from,
            to,
            mode,
            output,
            api_url,
            timeout,
        })
    }
}
