//! # dupscan
//!
//! Parallel duplicate detection for one column of delimited-text files.
//!
//! Each file gets its own producer thread that skips the header row and sends
//! the chosen field of every data row to a single collector. A coordinator
//! closes the channel once every producer has finished, and the collector
//! returns the per-value counts.
//!
//! ## Modules
//!
//! - [`cancel`]: shared one-way cancellation signal
//! - [`severity`]: strongest-failure tracker behind the exit status
//! - [`producer`]: per-file field producer
//! - [`collector`]: frequency counting
//! - [`scan`]: orchestration of producers, coordinator and collector
//! - [`report`]: duplicate rendering
//! - [`files`]: file list resolution

pub mod cancel;
pub mod collector;
pub mod files;
pub mod producer;
pub mod report;
pub mod scan;
pub mod severity;

pub use cancel::{cancel_on_interrupt, CancelSignal};
pub use collector::{collect, FieldValue, FrequencyMap};
pub use dupscan_core::{ExitStatus, Result, ScanError, Severity};
pub use files::resolve_files;
pub use producer::{FileOutcome, FileReport, FileTask, Producer};
pub use report::{duplicates, write_duplicates, Duplicate};
pub use scan::{scan, ScanConfig, ScanOutcome, Scanner};
pub use severity::SeverityTracker;
