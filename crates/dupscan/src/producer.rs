//! Per-file field producer.
//!
//! A producer owns one file for the duration of its run: it decodes rows,
//! discards the first (header) row, and emits one field of every following row
//! onto the shared channel. Each send is raced against the cancellation
//! signal, so a producer never blocks on a channel nobody will drain.
//!
//! Fields are emitted as raw bytes; a field that is not valid UTF-8 is still a
//! field. In fail-fast mode a decode failure cancels the whole scan. A file
//! that cannot be opened only records its severity.

use crate::cancel::CancelSignal;
use crate::collector::FieldValue;
use crate::scan::ScanConfig;
use crate::severity::SeverityTracker;
use crossbeam_channel::{select, Sender};
use csv::{ByteRecord, ReaderBuilder};
use dupscan_core::{ScanError, Severity};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// One file to scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileTask {
    path: PathBuf,
}

impl FileTask {
    /// Create a task for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path used to open the file and to identify it in reports.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl From<PathBuf> for FileTask {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&str> for FileTask {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// How a producer finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Reached end of input.
    Completed,
    /// Stopped early because the scan was cancelled.
    Cancelled,
    /// File could not be opened.
    OpenFailed(String),
    /// A record could not be decoded.
    DecodeFailed(String),
}

impl FileOutcome {
    fn from_error(err: &ScanError) -> Self {
        match err.severity() {
            Some(Severity::OpenFailure) => Self::OpenFailed(err.to_string()),
            _ => Self::DecodeFailed(err.to_string()),
        }
    }

    /// Severity this outcome contributes to the exit status.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::Completed | Self::Cancelled => Severity::None,
            Self::OpenFailed(_) => Severity::OpenFailure,
            Self::DecodeFailed(_) => Severity::DecodeFailure,
        }
    }
}

/// Summary of one producer run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// File the report belongs to.
    pub path: PathBuf,
    /// Rows decoded, header included.
    pub rows_read: u64,
    /// Field values delivered to the collector.
    pub values_emitted: u64,
    /// Final state.
    pub outcome: FileOutcome,
}

impl FileReport {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            rows_read: 0,
            values_emitted: 0,
            outcome: FileOutcome::Completed,
        }
    }

    fn finish(mut self, outcome: FileOutcome) -> Self {
        self.outcome = outcome;
        self
    }
}

/// Decodes one file and emits its target field.
///
/// Cheap to copy; the orchestrator hands one copy to every producer thread.
#[derive(Debug, Clone, Copy)]
pub struct Producer {
    field_index: usize,
    delimiter: u8,
    fail_fast: bool,
}

impl Producer {
    /// Create a producer for column `field_index` of comma-separated input.
    #[must_use]
    pub fn new(field_index: usize) -> Self {
        Self {
            field_index,
            delimiter: b',',
            fail_fast: true,
        }
    }

    /// Producer matching a scan configuration.
    #[must_use]
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            field_index: config.field_index,
            delimiter: config.delimiter,
            fail_fast: config.fail_fast,
        }
    }

    /// Set the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Whether a decode failure in this producer cancels the whole scan.
    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Open `task` and stream its field values into `out`.
    ///
    /// The file is closed on every exit path.
    pub fn run(
        &self,
        task: &FileTask,
        out: &Sender<FieldValue>,
        cancel: &CancelSignal,
        severity: &SeverityTracker,
    ) -> FileReport {
        let file = match File::open(task.path()) {
            Ok(file) => file,
            Err(source) => {
                let err = ScanError::Open {
                    path: task.path().to_path_buf(),
                    source,
                };
                return self.fail(FileReport::new(task.path()), &err, cancel, severity);
            }
        };
        debug!(file = %task.path().display(), "opened file");

        self.run_reader(task.path(), file, out, cancel, severity)
    }

    /// Stream field values from an already opened source.
    ///
    /// `path` only identifies the source in logs and the returned report.
    pub fn run_reader<R: Read>(
        &self,
        path: &Path,
        reader: R,
        out: &Sender<FieldValue>,
        cancel: &CancelSignal,
        severity: &SeverityTracker,
    ) -> FileReport {
        let mut report = FileReport::new(path);
        let mut rows = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(self.delimiter)
            .flexible(false)
            .from_reader(reader);
        let mut record = ByteRecord::new();

        loop {
            match rows.read_byte_record(&mut record) {
                Ok(true) => {}
                Ok(false) => {
                    info!(
                        file = %path.display(),
                        rows = report.rows_read,
                        values = report.values_emitted,
                        "reached end of file"
                    );
                    return report.finish(FileOutcome::Completed);
                }
                Err(source) => {
                    let err = ScanError::Decode {
                        path: path.to_path_buf(),
                        source,
                    };
                    return self.fail(report, &err, cancel, severity);
                }
            }

            report.rows_read += 1;
            if report.rows_read == 1 {
                // header
                continue;
            }

            let Some(field) = record.get(self.field_index) else {
                let err = ScanError::MissingField {
                    path: path.to_path_buf(),
                    record: report.rows_read,
                    index: self.field_index,
                };
                return self.fail(report, &err, cancel, severity);
            };

            if cancel.is_cancelled() {
                debug!(file = %path.display(), "cancelled between rows");
                return report.finish(FileOutcome::Cancelled);
            }

            let value = field.to_owned();
            select! {
                send(out, value) -> sent => {
                    if sent.is_err() {
                        warn!(file = %path.display(), "collector hung up, stopping");
                        return report.finish(FileOutcome::Cancelled);
                    }
                    report.values_emitted += 1;
                }
                recv(cancel.done()) -> _ => {
                    debug!(file = %path.display(), "cancelled while sending");
                    return report.finish(FileOutcome::Cancelled);
                }
            }
        }
    }

    /// Report for a producer thread that panicked instead of returning.
    pub(crate) fn panicked(
        &self,
        task: &FileTask,
        cancel: &CancelSignal,
        severity: &SeverityTracker,
    ) -> FileReport {
        error!(file = %task.path().display(), "producer panicked");
        severity.raise(Severity::DecodeFailure);
        if self.fail_fast {
            cancel.cancel();
        }
        FileReport::new(task.path())
            .finish(FileOutcome::DecodeFailed("producer panicked".to_string()))
    }

    fn fail(
        &self,
        report: FileReport,
        err: &ScanError,
        cancel: &CancelSignal,
        severity: &SeverityTracker,
    ) -> FileReport {
        error!(file = %report.path.display(), error = %err, "file failed");
        let level = err.severity();
        if let Some(level) = level {
            severity.raise(level);
        }
        // Open failures never cancel the other files.
        if self.fail_fast && level == Some(Severity::DecodeFailure) && cancel.cancel() {
            warn!("cancelling remaining files");
        }
        report.finish(FileOutcome::from_error(err))
    }
}
