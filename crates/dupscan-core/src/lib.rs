//! # dupscan-core
//!
//! Shared types for the dupscan tools:
//! - Error taxonomy for opening and decoding delimited files
//! - Failure severities and the process exit status they map to

pub mod error;
pub mod types;

pub use error::{Result, ScanError};
pub use types::{ExitStatus, Severity};
