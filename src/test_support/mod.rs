//! Test utilities for makegen unit tests.
//!
//! Provides on-disk source tree fixtures, a file loader that counts how
//! often each file is read, and one that refuses to read chosen files.

pub mod fixtures;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

pub use fixtures::*;

use crate::resolver::loader::{FsLoader, SourceLoader};

/// Reads from disk and records every read.
#[derive(Debug, Default)]
pub struct CountingLoader {
    reads: RefCell<HashMap<PathBuf, usize>>,
}

impl CountingLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `path` was read. Accepts non-canonical spellings.
    pub fn reads(&self, path: &Path) -> usize {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.reads.borrow().get(&key).copied().unwrap_or(0)
    }

    /// Total reads across all files.
    pub fn total_reads(&self) -> usize {
        self.reads.borrow().values().sum()
    }
}

impl SourceLoader for CountingLoader {
    fn read(&self, path: &Path) -> io::Result<String> {
        *self.reads.borrow_mut().entry(path.to_path_buf()).or_insert(0) += 1;
        FsLoader.read(path)
    }
}

/// Reads from disk, except for the listed files which fail with
/// `PermissionDenied`.
#[derive(Debug, Default)]
pub struct FailingLoader {
    fail: HashSet<PathBuf>,
}

impl FailingLoader {
    /// Paths may be non-canonical; they must exist.
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let fail = paths
            .into_iter()
            .map(|p| p.canonicalize().unwrap_or(p))
            .collect();
        FailingLoader { fail }
    }
}

impl SourceLoader for FailingLoader {
    fn read(&self, path: &Path) -> io::Result<String> {
        if self.fail.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            ));
        }
        FsLoader.read(path)
    }
}
