//! File reading seam for the dependency resolver.

use std::io;
use std::path::Path;

/// Reads file text for scanning.
///
/// The resolver reads every file through this trait, so tests can observe
/// how many times each file is opened.
pub trait SourceLoader {
    fn read(&self, path: &Path) -> io::Result<String>;
}

/// Reads from the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn read(&self, path: &Path) -> io::Result<String> {
        let bytes = std::fs::read(path)?;
        // Sources are not always valid UTF-8 (Latin-1 comments are common).
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl<L: SourceLoader + ?Sized> SourceLoader for &L {
    fn read(&self, path: &Path) -> io::Result<String> {
        (**self).read(path)
    }
}
