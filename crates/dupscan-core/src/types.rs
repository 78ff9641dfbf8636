//! Failure severities and the exit status they resolve to.

use serde::{Deserialize, Serialize};

/// How badly a single file failed.
///
/// Ordered so that the strongest severity observed across all files wins.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Severity {
    /// File scanned without structural error
    #[default]
    None = 0,
    /// File could not be opened
    OpenFailure = 1,
    /// A record could not be decoded
    DecodeFailure = 2,
}

impl Severity {
    /// Raw discriminant, suitable for an atomic holder.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Inverse of [`Severity::as_u8`]. Unknown values saturate to the strongest
    /// severity.
    #[must_use]
    pub const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::None,
            1 => Self::OpenFailure,
            _ => Self::DecodeFailure,
        }
    }
}

/// Final outcome of a scan, surfaced once at process end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitStatus {
    /// Empty file list, no producers were launched
    NothingToDo,
    /// Every file scanned without structural error
    Clean,
    /// At least one file could not be opened
    OpenFailure,
    /// At least one file could not be decoded
    DecodeFailure,
}

impl ExitStatus {
    /// Process exit code for this status.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::NothingToDo | Self::Clean => 0,
            Self::OpenFailure => 1,
            Self::DecodeFailure => 2,
        }
    }

    /// Whether any file failed.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        self.code() != 0
    }
}

impl From<Severity> for ExitStatus {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::None => Self::Clean,
            Severity::OpenFailure => Self::OpenFailure,
            Severity::DecodeFailure => Self::DecodeFailure,
        }
    }
}
