//! Export driver
//!
//! One run walks ParsingArgs → Fetching → Writing → Done, dropping into
//! Failed on the first error. Parsing happens in the binary; this module
//! owns the rest.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::{ExportConfig, ExportMode};
use crate::core::ExportError;
use crate::domain::{AlgorithmHistory, Payment};
use crate::infrastructure::StatsSource;
use crate::modules::export::{self, write_histories, write_payments};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ParsingArgs,
    Fetching,
    Writing,
    Done,
    Failed,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub rows: usize,
    /// Kept output file, `None` when writing to stdout
    pub path: Option<PathBuf>,
}

#[derive(Debug)]
enum Fetched {
    Payments(Vec<Payment>),
    Histories(Vec<AlgorithmHistory>),
}

/// Run one export with `source` as the stats backend
pub async fn run<S>(config: &ExportConfig, source: &S) -> Result<Summary, ExportError>
where
    S: StatsSource + ?Sized,
{
    let fetched = advance(Stage::Fetching, fetch(config, source).await)?;
    let summary = advance(Stage::Writing, write(config, fetched))?;

    debug!(stage = ?Stage::Done, rows = summary.rows, "export finished");
    Ok(summary)
}

fn advance<T>(stage: Stage, result: Result<T, ExportError>) -> Result<T, ExportError> {
    if let Err(err) = &result {
        debug!(?stage, next = ?Stage::Failed, %err, "export failed");
    }
    result
}

async fn fetch<S>(config: &ExportConfig, source: &S) -> Result<Fetched, ExportError>
where
    S: StatsSource + ?Sized,
{
    let since = config.since_ts();
    match config.mode {
        ExportMode::Payments => {
            info!(addr = %config.addr, from = %config.from, "getting payments");
            let payments = source.fetch_payments(&config.addr, since).await?;
            Ok(Fetched::Payments(payments))
        }
        ExportMode::History => {
            info!(addr = %config.addr, from = %config.from, "getting hashrate + history");
            let histories = source.fetch_algorithm_histories(&config.addr, since).await?;
            Ok(Fetched::Histories(histories))
        }
    }
}

fn write(config: &ExportConfig, fetched: Fetched) -> Result<Summary, ExportError> {
    let until = config.until_ts();
    let (rows, path) = match fetched {
        Fetched::Payments(payments) => {
            let payments = payments_before(payments, until);
            export::write_to(&config.output, |w| write_payments(w, &payments))?
        }
        Fetched::Histories(histories) => {
            let histories = histories_before(histories, until);
            export::write_to(&config.output, |w| write_histories(w, &histories))?
        }
    };

    Ok(Summary { rows, path })
}

/// Drop payments at or after `until`
pub fn payments_before(payments: Vec<Payment>, until: i64) -> Vec<Payment> {
    payments
        .into_iter()
        .filter(|payment| payment.timestamp < until)
        .collect()
}

/// Drop history buckets at or after `until`, keeping algorithm order
pub fn histories_before(histories: Vec<AlgorithmHistory>, until: i64) -> Vec<AlgorithmHistory> {
    histories
        .into_iter()
        .map(|mut history| {
            history.entries.retain(|entry| entry.timestamp < until);
            history
        })
        .collect()
}
