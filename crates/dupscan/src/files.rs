//! Resolution of the files to scan.
//!
//! An explicit comma-separated list takes priority over a glob pattern. An
//! empty result means there is nothing to do.

use crate::producer::FileTask;
use dupscan_core::Result;
use glob::glob;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Resolve `files` (e.g. `"a.csv,b.csv"`) or, failing that, `pattern`
/// (e.g. `"data/*.csv"`) into scan tasks.
///
/// Blank list entries are dropped. Pattern matches are returned in the glob's
/// alphabetical order; entries that cannot be read while globbing are skipped.
/// An invalid pattern is an error.
pub fn resolve_files(files: Option<&str>, pattern: Option<&str>) -> Result<Vec<FileTask>> {
    if let Some(list) = files.filter(|list| !list.trim().is_empty()) {
        debug!(files = list, "using explicit file list");
        return Ok(split_list(list));
    }

    if let Some(pattern) = pattern.filter(|pattern| !pattern.trim().is_empty()) {
        debug!(pattern, "globbing for files");
        let mut tasks = Vec::new();
        for entry in glob(pattern)? {
            match entry {
                Ok(path) => tasks.push(FileTask::new(path)),
                Err(err) => warn!(error = %err, "skipping unreadable glob entry"),
            }
        }
        return Ok(tasks);
    }

    Ok(Vec::new())
}

fn split_list(list: &str) -> Vec<FileTask> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| FileTask::new(PathBuf::from(name)))
        .collect()
}
