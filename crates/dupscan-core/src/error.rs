//! Error types for dupscan.

use crate::types::Severity;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for dupscan operations.
pub type Result<T> = std::result::Result<T, ScanError>;

/// Errors that can occur while resolving or scanning files.
#[derive(Error, Debug)]
pub enum ScanError {
    /// File could not be opened
    #[error("could not open file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record could not be decoded
    #[error("could not read record from {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Record is shorter than the requested field index
    #[error("record {record} in {} has no field at index {index}", .path.display())]
    MissingField {
        path: PathBuf,
        record: u64,
        index: usize,
    },

    /// Glob pattern could not be compiled
    #[error("cannot glob provided pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ScanError {
    /// Severity this error contributes to the exit status, if it is a
    /// per-file failure.
    #[must_use]
    pub fn severity(&self) -> Option<Severity> {
        match self {
            Self::Open { .. } => Some(Severity::OpenFailure),
            Self::Decode { .. } | Self::MissingField { .. } => Some(Severity::DecodeFailure),
            Self::Pattern(_) | Self::Config(_) => None,
        }
    }
}
