//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;
use walkdir::WalkDir;

use crate::core::source::SourceKind;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write file: {}", path.display()))
}

/// Canonicalize a path, but don't fail if it doesn't exist yet.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Whether an argument should be treated as a glob pattern.
pub fn is_glob_pattern(arg: &str) -> bool {
    arg.contains(['*', '?', '['])
}

/// Expand command-line source arguments into file paths.
///
/// Plain paths are kept as given, even if they do not exist, so a missing
/// source is reported by the resolver with the spelling the user typed.
/// Directories are walked for C/C++ sources and headers. Glob patterns are
/// expanded. Each directory or pattern contributes its matches in sorted
/// order; argument order is preserved.
pub fn expand_sources(args: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    for arg in args {
        let arg_str = arg.to_string_lossy();

        if arg.is_dir() {
            results.extend(walk_sources(arg));
        } else if !arg.exists() && is_glob_pattern(&arg_str) {
            let mut matched = Vec::new();
            for entry in glob(&arg_str)
                .with_context(|| format!("invalid glob pattern: {}", arg_str))?
            {
                match entry {
                    Ok(path) if path.is_file() => matched.push(path),
                    Ok(_) => {}
                    Err(e) => tracing::warn!("glob error: {}", e),
                }
            }
            if matched.is_empty() {
                tracing::warn!("pattern `{}` matched no files", arg_str);
            }
            matched.sort();
            results.extend(matched);
        } else {
            results.push(arg.clone());
        }
    }

    Ok(results)
}

/// Recursively collect handled source files under `dir`, skipping hidden
/// directories.
fn walk_sources(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| SourceKind::from_path(p).is_handled())
        .collect();

    files.sort();
    files
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with('.'))
}
