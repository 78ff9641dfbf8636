//! Monotonic holder for the strongest failure severity seen during a scan.

use dupscan_core::Severity;
use std::sync::atomic::{AtomicU8, Ordering};

/// Concurrent "compare and raise" severity tracker.
///
/// Producers call [`SeverityTracker::raise`] from any thread. The final value
/// is only available by consuming the tracker, so it cannot be read while a
/// producer may still write to it.
#[derive(Debug, Default)]
pub struct SeverityTracker {
    level: AtomicU8,
}

impl SeverityTracker {
    /// Create a tracker at [`Severity::None`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the tracked severity to at least `severity`.
    ///
    /// Returns the severity held before this call.
    pub fn raise(&self, severity: Severity) -> Severity {
        Severity::from_u8(self.level.fetch_max(severity.as_u8(), Ordering::AcqRel))
    }

    /// Final severity.
    #[must_use]
    pub fn into_inner(self) -> Severity {
        Severity::from_u8(self.level.into_inner())
    }
}
