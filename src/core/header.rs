//! Include targets, before and after path resolution.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Delimiter style of an `#include` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncludeStyle {
    /// `#include "x.h"`: including directory first, then search paths
    Quoted,
    /// `#include <x.h>`: search paths only
    Angle,
}

/// A textual include target as it appears in a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeaderRef {
    /// Text between the delimiters
    pub name: String,
    /// Delimiter style
    pub style: IncludeStyle,
    /// 1-based line number of the directive
    pub line: usize,
}

impl HeaderRef {
    pub fn quoted(name: impl Into<String>) -> Self {
        HeaderRef {
            name: name.into(),
            style: IncludeStyle::Quoted,
            line: 0,
        }
    }

    pub fn angle(name: impl Into<String>) -> Self {
        HeaderRef {
            name: name.into(),
            style: IncludeStyle::Angle,
            line: 0,
        }
    }

}

impl fmt::Display for HeaderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.style {
            IncludeStyle::Quoted => write!(f, "\"{}\"", self.name),
            IncludeStyle::Angle => write!(f, "<{}>", self.name),
        }
    }
}

/// Which search location satisfied an include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum SearchOrigin {
    /// Directory of the including file (quoted includes only)
    IncludingDir,
    /// Absolute include target
    Absolute,
    /// `-I` path at this index
    IncludePath(usize),
    /// `-isystem` path at this index
    SystemPath(usize),
}

impl SearchOrigin {
    pub fn is_system(&self) -> bool {
        matches!(self, SearchOrigin::SystemPath(_))
    }
}

/// A header located on disk.
///
/// Equality and hashing only look at the canonical path, so two different
/// spellings of the same file are the same header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedHeader {
    /// Canonical filesystem path
    pub path: PathBuf,
    /// The candidate path that matched, before symlinks are resolved
    pub found_at: PathBuf,
    /// Where the search found it
    pub origin: SearchOrigin,
}

impl ResolvedHeader {
    /// Directory searched first for quoted includes inside this header.
    ///
    /// This is the directory the header was reached through, which differs
    /// from the canonical parent when the header is a symlink.
    pub fn including_dir(&self) -> &Path {
        match self.found_at.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl PartialEq for ResolvedHeader {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for ResolvedHeader {}

impl std::hash::Hash for ResolvedHeader {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_keeps_delimiters() {
        assert_eq!(HeaderRef::quoted("util.h").to_string(), "\"util.h\"");
        assert_eq!(HeaderRef::angle("stdio.h").to_string(), "<stdio.h>");
    }

    #[test]
    fn test_resolved_identity_ignores_origin() {
        let a = ResolvedHeader {
            path: PathBuf::from("/p/inc/a.h"),
            found_at: PathBuf::from("/p/src/../inc/a.h"),
            origin: SearchOrigin::IncludingDir,
        };
        let b = ResolvedHeader {
            path: PathBuf::from("/p/inc/a.h"),
            found_at: PathBuf::from("/p/inc/a.h"),
            origin: SearchOrigin::IncludePath(0),
        };
        assert_eq!(a, b);
        assert_eq!(a.including_dir(), Path::new("/p/src/../inc"));
    }
}
