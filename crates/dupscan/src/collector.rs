//! Aggregation of emitted field values into per-value counts.
//!
//! Values are raw field bytes. Two values are equal only when their bytes are,
//! and nothing requires them to be valid UTF-8.

use crossbeam_channel::Receiver;
use std::collections::hash_map::{self, HashMap};
use tracing::debug;

/// One field value as it appeared in the input.
pub type FieldValue = Vec<u8>;

/// Occurrence count per distinct field value.
///
/// Iteration order is unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyMap {
    counts: HashMap<FieldValue, u64>,
}

impl FrequencyMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `value`.
    pub fn record(&mut self, value: FieldValue) {
        *self.counts.entry(value).or_insert(0) += 1;
    }

    /// Occurrences of `value`, zero if never seen.
    #[must_use]
    pub fn count(&self, value: impl AsRef<[u8]>) -> u64 {
        self.counts.get(value.as_ref()).copied().unwrap_or(0)
    }

    /// Number of distinct values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether nothing was counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total occurrences across all values.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// All `(value, count)` entries.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], u64)> {
        self.counts
            .iter()
            .map(|(value, &count)| (value.as_slice(), count))
    }

    /// Entries seen more than once.
    pub fn duplicates(&self) -> impl Iterator<Item = (&[u8], u64)> {
        self.iter().filter(|&(_, count)| count > 1)
    }

    /// Underlying map.
    #[must_use]
    pub fn into_inner(self) -> HashMap<FieldValue, u64> {
        self.counts
    }
}

impl<V: Into<FieldValue>> FromIterator<V> for FrequencyMap {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut map = Self::new();
        for value in iter {
            map.record(value.into());
        }
        map
    }
}

impl IntoIterator for FrequencyMap {
    type Item = (FieldValue, u64);
    type IntoIter = hash_map::IntoIter<FieldValue, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.into_iter()
    }
}

/// Drain `rx` until every sender is gone, counting each value.
///
/// Never times out: returns only once the channel is closed and empty.
pub fn collect(rx: Receiver<FieldValue>) -> FrequencyMap {
    let map: FrequencyMap = rx.into_iter().collect();
    debug!(
        values = map.total(),
        distinct = map.len(),
        "channel closed, collection finished"
    );
    map
}
