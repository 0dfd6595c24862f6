//! Build-file renderers.
//!
//! A renderer turns a finished [`ProjectModel`] into the text of one or more
//! build files. Renderers do no resolution of their own: dependency sets
//! come from the model's graph, paths are made relative to the output
//! directory by [`RenderContext`].

pub mod automake;
pub mod cmake;
pub mod make;

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::core::project::{Define, ProjectModel};
use crate::core::source::{SourceFile, SourceKind};
use crate::util::diagnostic::{Diagnostic, UnsupportedFormatError};
use crate::util::fs::{normalize_path, relative_path};

pub use automake::AutomakeRenderer;
pub use cmake::CMakeRenderer;
pub use make::MakeRenderer;

/// First line of every generated file.
pub const GENERATED_BANNER: &str = "Generated by makegen. Regenerate instead of editing by hand.";

/// Errors selecting an output format.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unknown format `{name}`")]
    Unsupported { name: String },
}

impl FormatError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            FormatError::Unsupported { name } => {
                Diagnostic::error(format!("unknown format `{}`", name))
                    .with_context(format!("supported formats are: {}", Format::supported_list()))
                    .with_suggestion("Pass one of the supported formats with `-f`")
            }
        }
    }

    /// Structured form for `miette` reporting.
    pub fn to_report(&self) -> UnsupportedFormatError {
        match self {
            FormatError::Unsupported { name } => UnsupportedFormatError {
                name: name.clone(),
                supported: Some(format!(
                    "supported formats are: {}",
                    Format::supported_list()
                )),
            },
        }
    }
}

/// Output build-description format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    /// Plain `Makefile`
    #[default]
    Make,
    /// `CMakeLists.txt`
    CMake,
    /// `Makefile.am` plus `configure.ac`
    Automake,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Make, Format::CMake, Format::Automake];

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Make => "make",
            Format::CMake => "cmake",
            Format::Automake => "automake",
        }
    }

    /// Comma-separated list of format names.
    pub fn supported_list() -> String {
        Format::ALL
            .iter()
            .map(Format::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The renderer for this format.
    pub fn renderer(&self) -> Box<dyn Renderer> {
        match self {
            Format::Make => Box::new(MakeRenderer),
            Format::CMake => Box::new(CMakeRenderer),
            Format::Automake => Box::new(AutomakeRenderer),
        }
    }
}

impl FromStr for Format {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "make" | "makefile" => Ok(Format::Make),
            "cmake" => Ok(Format::CMake),
            "automake" | "autotools" | "autoconf" => Ok(Format::Automake),
            _ => Err(FormatError::Unsupported {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    /// File name relative to the output directory
    pub name: String,
    /// File contents
    pub contents: String,
}

impl RenderedFile {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        RenderedFile {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

/// Serializes a project into one build-description format.
pub trait Renderer {
    fn format(&self) -> Format;

    fn render(&self, project: &ProjectModel, ctx: &RenderContext) -> Vec<RenderedFile>;
}

/// Where generated files will live. Every path a renderer writes is made
/// relative to this directory.
#[derive(Debug, Clone)]
pub struct RenderContext {
    base: PathBuf,
}

impl RenderContext {
    /// `out_dir` may be relative to the current directory and need not exist.
    pub fn new(out_dir: &Path) -> Self {
        RenderContext {
            base: absolute(out_dir),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// `path` relative to the output directory.
    pub fn path(&self, path: &Path) -> String {
        let rel = relative_path(&self.base, &absolute(path));
        if rel.as_os_str().is_empty() {
            ".".to_string()
        } else {
            rel.display().to_string()
        }
    }

    /// A source file as written into the build file.
    pub fn source(&self, source: &SourceFile) -> String {
        self.path(&source.canonical)
    }

    /// The object file a source compiles to, next to the source.
    pub fn object(&self, source: &SourceFile) -> Option<String> {
        source
            .object_path()
            .map(|_| self.path(&source.canonical.with_extension("o")))
    }

    /// Object files of all compiled sources, in source order.
    pub fn objects(&self, project: &ProjectModel) -> Vec<String> {
        project
            .compiled_sources()
            .filter_map(|s| self.object(s))
            .collect()
    }

    /// Transitive header dependencies of a source.
    pub fn dependencies(&self, project: &ProjectModel, source: &SourceFile) -> Vec<String> {
        project.dependencies(source).map(|p| self.path(p)).collect()
    }

    /// Sources followed by every header they pull in, without duplicates.
    ///
    /// Used by formats that list headers next to sources.
    pub fn sources_with_headers(&self, project: &ProjectModel) -> Vec<String> {
        let mut listed: BTreeSet<&Path> = BTreeSet::new();
        let mut out = Vec::new();

        for source in renderable_sources(project) {
            if listed.insert(source.canonical.as_path()) {
                out.push(self.source(source));
            }
        }

        let mut headers: BTreeSet<&Path> = BTreeSet::new();
        for source in renderable_sources(project) {
            headers.extend(project.dependencies(source));
        }
        for header in headers {
            if listed.insert(header) {
                out.push(self.path(header));
            }
        }

        out
    }

    /// `-D` flags then `-I` and `-isystem` flags, quoted for the shell.
    pub fn preprocessor_flags(&self, project: &ProjectModel) -> Vec<String> {
        let mut flags: Vec<String> = project.defines.iter().map(Define::to_shell_flag).collect();
        flags.extend(
            project
                .include_paths
                .iter()
                .map(|p| format!("-I{}", self.path(p))),
        );
        flags.extend(
            project
                .system_paths
                .iter()
                .map(|p| format!("-isystem {}", self.path(p))),
        );
        flags
    }

    /// `-L` flags in the order given.
    pub fn library_path_flags(&self, project: &ProjectModel) -> Vec<String> {
        project
            .library_paths
            .iter()
            .map(|p| format!("-L{}", self.path(p)))
            .collect()
    }
}

/// Sources a renderer can place in a build file. Unknown file types are
/// reported once here and skipped.
pub fn renderable_sources(project: &ProjectModel) -> impl Iterator<Item = &SourceFile> {
    project.sources.iter().filter(|s| s.kind != SourceKind::Other)
}

/// Warn about sources no renderer knows how to build.
pub fn warn_unknown_sources(project: &ProjectModel) {
    for source in project.sources.iter().filter(|s| s.kind == SourceKind::Other) {
        tracing::warn!(
            "don't know how to generate a rule for `{}`, skipping",
            source.path.display()
        );
    }
}

/// Absolute, canonical where possible, form of `path`.
fn absolute(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    if joined.exists() {
        return normalize_path(&joined);
    }

    // Canonicalize the deepest existing ancestor so paths that do not exist
    // yet still compare equal to canonical ones.
    let mut existing = joined.as_path();
    let mut rest = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                existing = parent;
            }
            _ => return joined,
        }
    }
    let mut out = normalize_path(existing);
    out.extend(rest.iter().rev());
    out
}

/// Join words with single spaces.
pub(crate) fn join(words: &[String]) -> String {
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("make".parse::<Format>().unwrap(), Format::Make);
        assert_eq!("CMake".parse::<Format>().unwrap(), Format::CMake);
        assert_eq!("automake".parse::<Format>().unwrap(), Format::Automake);

        let err = "ninja".parse::<Format>().unwrap_err();
        assert!(matches!(err, FormatError::Unsupported { ref name } if name == "ninja"));

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("unknown format `ninja`"));
        assert!(output.contains("make, cmake, automake"));
    }

    #[test]
    fn test_unsupported_format_report() {
        use miette::Diagnostic as _;

        let err = "ninja".parse::<Format>().unwrap_err();
        let report = miette::Report::new(err.to_report());

        assert_eq!(report.to_string(), "unknown format `ninja`");
        let help = report.help().map(|h| h.to_string()).unwrap();
        assert!(help.contains("make, cmake, automake"));
    }

    #[test]
    fn test_renderer_matches_format() {
        for format in Format::ALL {
            assert_eq!(format.renderer().format(), format);
        }
    }

    #[test]
    fn test_context_paths() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("src")).unwrap();

        let ctx = RenderContext::new(tmp.path());
        assert_eq!(ctx.path(&tmp.path().join("src/a.h")), "src/a.h");
        assert_eq!(ctx.path(tmp.path()), ".");

        let nested = RenderContext::new(&tmp.path().join("build/gen"));
        assert_eq!(nested.path(&tmp.path().join("src/a.h")), "../../src/a.h");
    }
}
