//! Scan orchestration.
//!
//! ```text
//!   file 1 ──▶ producer ─┐
//!   file 2 ──▶ producer ─┼──▶ channel ──▶ collector ──▶ FrequencyMap
//!   file N ──▶ producer ─┘       ▲
//!                                │ drops the last Sender
//!                           coordinator (joins every producer)
//! ```
//!
//! Every producer holds a clone of the channel's `Sender` and drops it when it
//! returns. The coordinator owns the original and drops it only after joining
//! all producers, so the channel closes exactly once, after the last send.
//! A decode failure in fail-fast mode (or an interrupt) sets the shared
//! [`CancelSignal`]; the remaining producers observe it between rows and exit.
//! A file that cannot be opened is recorded and the others carry on.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dupscan::{FileTask, ScanConfig, Scanner};
//!
//! let scanner = Scanner::new(ScanConfig::default());
//! let outcome = scanner
//!     .scan(&[FileTask::new("a.csv"), FileTask::new("b.csv")])
//!     .unwrap();
//! for duplicate in outcome.duplicates() {
//!     println!("{duplicate}");
//! }
//! std::process::exit(i32::from(outcome.status.code()));
//! ```

use crate::cancel::CancelSignal;
use crate::collector::{collect, FieldValue, FrequencyMap};
use crate::producer::{FileReport, FileTask, Producer};
use crate::report::{self, Duplicate};
use crate::severity::SeverityTracker;
use crossbeam_channel::bounded;
use dupscan_core::{ExitStatus, Result, ScanError};
use serde::{Deserialize, Serialize};
use std::panic;
use std::thread;
use std::time::Instant;
use tracing::info;

/// Configuration for a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Zero-based column whose values are counted.
    pub field_index: usize,
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Channel buffer between producers and the collector (0 = rendezvous).
    pub channel_capacity: usize,
    /// Cancel every producer as soon as one file fails to decode.
    pub fail_fast: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            field_index: 1,
            delimiter: b',',
            channel_capacity: 0,
            fail_fast: true,
        }
    }
}

impl ScanConfig {
    /// Config counting column `field_index`.
    #[must_use]
    pub fn for_field(field_index: usize) -> Self {
        Self {
            field_index,
            ..Default::default()
        }
    }

    /// Set the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the channel buffer size.
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Keep scanning healthy files after one fails to decode.
    #[must_use]
    pub fn keep_going(mut self) -> Self {
        self.fail_fast = false;
        self
    }

    /// Reject delimiters the record decoder cannot use.
    pub fn validate(&self) -> Result<()> {
        match self.delimiter {
            b'"' | b'\n' | b'\r' => Err(ScanError::Config(format!(
                "delimiter {:?} is reserved",
                char::from(self.delimiter)
            ))),
            d if !d.is_ascii() => Err(ScanError::Config(
                "delimiter must be a single ASCII character".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Everything a finished scan produced.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Counts of every emitted value.
    pub frequencies: FrequencyMap,
    /// Strongest failure across all files.
    pub status: ExitStatus,
    /// Per-file reports, in task order.
    pub files: Vec<FileReport>,
    /// Whether the cancellation signal was set by the end of the scan.
    pub cancelled: bool,
    /// Wall time in seconds.
    pub elapsed_secs: f64,
}

impl ScanOutcome {
    fn nothing_to_do() -> Self {
        Self {
            frequencies: FrequencyMap::new(),
            status: ExitStatus::NothingToDo,
            files: Vec::new(),
            cancelled: false,
            elapsed_secs: 0.0,
        }
    }

    /// Values seen more than once, in unspecified order.
    #[must_use]
    pub fn duplicates(&self) -> Vec<Duplicate> {
        report::duplicates(&self.frequencies)
    }
}

/// Runs producers, coordinator and collector for a set of files.
#[derive(Debug, Default)]
pub struct Scanner {
    config: ScanConfig,
    cancel: CancelSignal,
}

impl Scanner {
    /// Create a scanner with its own cancellation signal.
    #[must_use]
    pub fn new(config: ScanConfig) -> Self {
        Self::with_cancel(config, CancelSignal::new())
    }

    /// Create a scanner observing an existing signal (e.g. one wired to Ctrl-C).
    #[must_use]
    pub fn with_cancel(config: ScanConfig, cancel: CancelSignal) -> Self {
        Self { config, cancel }
    }

    /// The signal producers observe. Setting it stops the scan early.
    #[must_use]
    pub fn cancel_signal(&self) -> &CancelSignal {
        &self.cancel
    }

    /// Scan `tasks` and count field values across all of them.
    ///
    /// Per-file failures never fail the scan; they are reported in
    /// [`ScanOutcome::files`] and folded into [`ScanOutcome::status`]. Only an
    /// invalid configuration returns an error.
    pub fn scan(&self, tasks: &[FileTask]) -> Result<ScanOutcome> {
        self.config.validate()?;

        if tasks.is_empty() {
            info!("no files to scan");
            return Ok(ScanOutcome::nothing_to_do());
        }

        let start = Instant::now();
        info!(
            files = tasks.len(),
            field = self.config.field_index,
            "scanning files for duplicates"
        );

        let (tx, rx) = bounded::<FieldValue>(self.config.channel_capacity);
        let severity = SeverityTracker::new();
        let producer = Producer::from_config(&self.config);
        let cancel = &self.cancel;
        let severity_ref = &severity;

        let (frequencies, files) = thread::scope(|s| {
            let producers: Vec<_> = tasks
                .iter()
                .map(|task| {
                    let out = tx.clone();
                    let handle = s.spawn(move || producer.run(task, &out, cancel, severity_ref));
                    (task, handle)
                })
                .collect();

            let coordinator = s.spawn(move || {
                let reports: Vec<FileReport> = producers
                    .into_iter()
                    .map(|(task, handle)| {
                        handle
                            .join()
                            .unwrap_or_else(|_| producer.panicked(task, cancel, severity_ref))
                    })
                    .collect();
                info!("all files have been scanned");
                drop(tx);
                reports
            });

            let collector = s.spawn(move || collect(rx));

            let frequencies = collector
                .join()
                .unwrap_or_else(|payload| panic::resume_unwind(payload));
            let files = coordinator
                .join()
                .unwrap_or_else(|payload| panic::resume_unwind(payload));
            (frequencies, files)
        });

        let status = ExitStatus::from(severity.into_inner());
        let elapsed_secs = start.elapsed().as_secs_f64();
        info!(
            values = frequencies.total(),
            distinct = frequencies.len(),
            status = ?status,
            elapsed_secs,
            "scan finished"
        );

        Ok(ScanOutcome {
            frequencies,
            status,
            files,
            cancelled: self.cancel.is_cancelled(),
            elapsed_secs,
        })
    }
}

/// Scan `tasks` with a fresh scanner.
pub fn scan(tasks: &[FileTask], config: ScanConfig) -> Result<ScanOutcome> {
    Scanner::new(config).scan(tasks)
}
