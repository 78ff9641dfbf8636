//! Duplicate report rendering.

use crate::collector::FrequencyMap;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};

/// A field value seen more than once.
///
/// `value` is the field's text; bytes that are not valid UTF-8 are shown as
/// U+FFFD.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Duplicate {
    /// The repeated value.
    pub value: String,
    /// How many times it occurred across all files.
    pub count: u64,
}

impl fmt::Display for Duplicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DUPLICATE FOUND: {} found {} times",
            self.value, self.count
        )
    }
}

/// Every value with a count above one, in the map's (unspecified) order.
#[must_use]
pub fn duplicates(frequencies: &FrequencyMap) -> Vec<Duplicate> {
    frequencies
        .duplicates()
        .map(|(value, count)| Duplicate {
            value: String::from_utf8_lossy(value).into_owned(),
            count,
        })
        .collect()
}

/// Write one line per duplicate.
pub fn write_duplicates<W: Write>(mut out: W, duplicates: &[Duplicate]) -> io::Result<()> {
    for duplicate in duplicates {
        writeln!(out, "{duplicate}")?;
    }
    out.flush()
}
