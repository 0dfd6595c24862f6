//! Resolution error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::{Diagnostic, SourceUnreadableError};

/// Error that aborts dependency resolution.
///
/// Only problems with user-specified inputs are errors. Headers that cannot
/// be found or read are dropped from the graph instead.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to read source file `{}`: {reason}", path.display())]
    SourceUnreadable { path: PathBuf, reason: String },

    #[error("`{}` is not a regular file", path.display())]
    NotAFile { path: PathBuf },
}

impl ResolveError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ResolveError::SourceUnreadable { path, .. } | ResolveError::NotAFile { path } => path,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::SourceUnreadable { path, reason } => {
                Diagnostic::error(format!("failed to read source file `{}`", path.display()))
                    .with_location(path)
                    .with_context(reason.clone())
                    .with_suggestion("Check that the file exists and is readable")
                    .with_suggestion("Source files are never skipped; remove it from the command line if it is not needed")
            }
            ResolveError::NotAFile { path } => {
                Diagnostic::error(format!("`{}` is not a regular file", path.display()))
                    .with_location(path)
                    .with_suggestion("Pass a directory without a trailing file name to scan it for sources")
            }
        }
    }

    /// Structured form for `miette` reporting.
    pub fn to_report(&self) -> SourceUnreadableError {
        let reason = match self {
            ResolveError::SourceUnreadable { reason, .. } => reason.clone(),
            ResolveError::NotAFile { .. } => "not a regular file".to_string(),
        };
        SourceUnreadableError {
            path: self.path().display().to_string(),
            reason,
        }
    }
}
