//! Source file classification and identity.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::header::HeaderRef;

/// Extensions compiled as C.
const C_EXTENSIONS: &[&str] = &["c"];

/// Extensions compiled as C++.
const CXX_EXTENSIONS: &[&str] = &["cpp", "cxx", "cc", "C", "c++"];

/// Extensions treated as headers (never compiled on their own).
const HEADER_EXTENSIONS: &[&str] = &["h", "hpp", "hh", "hxx", "inl"];

/// What a file is, judged by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// C translation unit
    C,
    /// C++ translation unit
    Cxx,
    /// Header, listed as a source but never compiled
    Header,
    /// Anything else; renderers skip these with a warning
    Other,
}

impl SourceKind {
    /// Classify a path by its extension.
    pub fn from_path(path: &Path) -> Self {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return SourceKind::Other;
        };

        // `.C` is C++ on case-sensitive filesystems, so match exactly first.
        if CXX_EXTENSIONS.contains(&ext) {
            SourceKind::Cxx
        } else if C_EXTENSIONS.contains(&ext) {
            SourceKind::C
        } else if HEADER_EXTENSIONS.contains(&ext) {
            SourceKind::Header
        } else {
            SourceKind::Other
        }
    }

    /// Whether this file produces an object file.
    pub fn is_compiled(&self) -> bool {
        matches!(self, SourceKind::C | SourceKind::Cxx)
    }

    /// Whether a directory walk should pick this file up.
    pub fn is_handled(&self) -> bool {
        !matches!(self, SourceKind::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::C => "c",
            SourceKind::Cxx => "c++",
            SourceKind::Header => "header",
            SourceKind::Other => "other",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-specified input file.
///
/// Identity is the canonical path; `path` keeps the spelling the user gave
/// so renderers can emit it the way it was written.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path as supplied on the command line
    pub path: PathBuf,
    /// Canonical path (symlinks, `.` and `..` resolved)
    pub canonical: PathBuf,
    /// File classification
    pub kind: SourceKind,
    /// Direct `#include` directives, in file order
    pub includes: Vec<HeaderRef>,
}

impl SourceFile {
    /// Object file this source compiles to, next to the source.
    pub fn object_path(&self) -> Option<PathBuf> {
        if self.kind.is_compiled() {
            Some(self.path.with_extension("o"))
        } else {
            None
        }
    }
}

impl PartialEq for SourceFile {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for SourceFile {}
