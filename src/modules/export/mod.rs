//! Export Module
//!
//! Provides the CSV projection and the output side of a run:
//!
//! - Payments / histories → CSV rows (see `csv_export`)
//! - Output goes to stdout or to a file created exclusively for this run
//! - A file left behind by a failed run is removed

mod csv_export;

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::{ExportMode, OutputTarget};
use crate::core::ExportError;

pub use csv_export::{
    format_timestamp, history_record, payment_record, write_histories, write_payments,
    HISTORY_HEADER, PAYMENTS_HEADER,
};

/// Generate the default file name, `{from}-{to}-{addr}-{mode}.csv`
pub fn default_file_name(from: &str, to: &str, addr: &str, mode: ExportMode) -> String {
    format!("{}-{}-{}-{}.csv", from, to, addr, mode.as_str())
}

/// An output file that is deleted on drop unless the run committed it
#[derive(Debug)]
pub struct PendingFile {
    path: PathBuf,
    file: File,
    committed: bool,
}

impl PendingFile {
    /// Create `path`, failing if it already exists
    pub fn create(path: &Path) -> Result<Self, ExportError> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| ExportError::Write(format!("create {}: {}", path.display(), e)))?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            committed: false,
        })
    }

    /// Sync the file to disk and keep it
    pub fn commit(mut self) -> Result<PathBuf, ExportError> {
        self.file.sync_all()?;
        self.committed = true;
        Ok(self.path.clone())
    }
}

impl Write for PendingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => warn!(path = %self.path.display(), "removed partial output"),
            Err(err) => warn!(path = %self.path.display(), %err, "failed to remove partial output"),
        }
    }
}

/// Run `write` against the output target.
///
/// Returns the row count reported by `write` and, for file targets, the
/// path that was kept.
pub fn write_to<F>(target: &OutputTarget, write: F) -> Result<(usize, Option<PathBuf>), ExportError>
where
    F: FnOnce(&mut dyn Write) -> Result<usize, ExportError>,
{
    match target {
        OutputTarget::Stdout => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            let rows = write(&mut lock)?;
            lock.flush()?;
            Ok((rows, None))
        }
        OutputTarget::File(path) => {
            let mut pending = PendingFile::create(path)?;
            let rows = write(&mut pending)?;
            let path = pending.commit()?;
            Ok((rows, Some(path)))
        }
    }
}
