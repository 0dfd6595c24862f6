//! The format-agnostic project description handed to renderers.
//!
//! A [`ProjectSpec`] is the skeleton collected from the command line and
//! config files. Once the dependency resolver has run, the project spec, the scanned
//! sources and the [`DependencyGraph`] are merged into an immutable
//! [`ProjectModel`].

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::source::{SourceFile, SourceKind};
use crate::resolver::DependencyGraph;
use crate::util::diagnostic::Diagnostic;

/// Default executable name when `-o` is not given.
pub const DEFAULT_EXE_NAME: &str = "a.out";

/// Default project name when `-n` is not given.
pub const DEFAULT_PROJECT_NAME: &str = "my_project";

/// Errors raised while validating or assembling a project.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("no source files given")]
    NoSources,

    #[error("invalid preprocessor definition `{0}`")]
    InvalidDefine(String),

    #[error("output name must not be empty")]
    EmptyOutputName,
}

impl ModelError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ModelError::NoSources => Diagnostic::error("no source files given")
                .with_suggestion("Pass one or more .c/.cpp/.h files or a directory to scan"),
            ModelError::InvalidDefine(raw) => {
                Diagnostic::error(format!("invalid preprocessor definition `{}`", raw))
                    .with_context("definitions take the form NAME or NAME=VALUE")
            }
            ModelError::EmptyOutputName => Diagnostic::error("output name must not be empty")
                .with_suggestion("Pass a file name with `-o`, e.g. `-o app`"),
        }
    }
}

/// The artifact the generated build produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// Executable binary
    #[default]
    Executable,
    /// Static archive (`.a`)
    StaticLibrary,
    /// Shared object (`.so` / `.dylib`)
    SharedLibrary,
}

impl OutputKind {
    /// Infer the kind from an output file name.
    pub fn infer(output: &str) -> Self {
        let file = Path::new(output)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(output);

        if file.ends_with(".a") {
            OutputKind::StaticLibrary
        } else if file.ends_with(".so") || file.ends_with(".dylib") || file.contains(".so.") {
            OutputKind::SharedLibrary
        } else {
            OutputKind::Executable
        }
    }

    /// Default output file name for a project.
    pub fn default_output(&self, project: &str) -> String {
        match self {
            OutputKind::Executable => DEFAULT_EXE_NAME.to_string(),
            OutputKind::StaticLibrary => format!("lib{}.a", project),
            OutputKind::SharedLibrary => format!("lib{}.so", project),
        }
    }

    pub fn is_library(&self) -> bool {
        !matches!(self, OutputKind::Executable)
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKind::Executable => write!(f, "executable"),
            OutputKind::StaticLibrary => write!(f, "static library"),
            OutputKind::SharedLibrary => write!(f, "shared library"),
        }
    }
}

/// A preprocessor definition (`-DNAME`, `-DNAME=VALUE` or
/// `-DNAME(ARGS)=VALUE`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Define {
    pub name: String,
    /// Parameter list of a function-like macro
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<String>>,
    pub value: Option<String>,
}

impl Define {
    /// Parse `NAME`, `NAME=VALUE` or `NAME(A,B)=VALUE`. A leading `-D` is
    /// accepted and stripped.
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let invalid = || ModelError::InvalidDefine(raw.to_string());
        let rest = raw.strip_prefix("-D").unwrap_or(raw).trim();

        let (head, value) = match rest.split_once('=') {
            Some((head, value)) => (head.trim(), Some(value.to_string())),
            None => (rest, None),
        };

        let (name, params) = match head.split_once('(') {
            Some((name, list)) => {
                let list = list.strip_suffix(')').ok_or_else(invalid)?;
                (name.trim_end(), Some(parse_params(list).ok_or_else(invalid)?))
            }
            None => (head, None),
        };

        if !is_identifier(name) {
            return Err(invalid());
        }

        Ok(Define {
            name: name.to_string(),
            params,
            value,
        })
    }

    /// `NAME`, `NAME=VALUE` or `NAME(A,B)=VALUE`, without the `-D`.
    pub fn to_assignment(&self) -> String {
        let mut head = self.name.clone();
        if let Some(params) = &self.params {
            head = format!("{}({})", head, params.join(","));
        }
        match &self.value {
            Some(v) => format!("{}={}", head, v),
            None => head,
        }
    }

    /// Compiler flag form.
    pub fn to_flag(&self) -> String {
        format!("-D{}", self.to_assignment())
    }

    /// Compiler flag, single-quoted when the shell would otherwise split or
    /// expand it.
    pub fn to_shell_flag(&self) -> String {
        let flag = self.to_flag();
        let plain = flag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_=.,/+:@%".contains(c));
        if plain {
            flag
        } else {
            format!("'{}'", flag.replace('\'', "'\\''"))
        }
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Comma-separated macro parameters. `...` is allowed last.
fn parse_params(list: &str) -> Option<Vec<String>> {
    if list.trim().is_empty() {
        return Some(Vec::new());
    }
    let params: Vec<String> = list.split(',').map(|p| p.trim().to_string()).collect();
    let last = params.len() - 1;
    for (i, param) in params.iter().enumerate() {
        let ok = is_identifier(param) || (i == last && param == "...");
        if !ok {
            return None;
        }
    }
    Some(params)
}

/// Compiler and archiver names written into generated files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolchain {
    pub cc: String,
    pub cxx: String,
    pub ar: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Toolchain {
            cc: "gcc".to_string(),
            cxx: "g++".to_string(),
            ar: "ar".to_string(),
        }
    }
}

/// Project skeleton collected from the command line and config.
#[derive(Debug, Clone, Default)]
pub struct ProjectSpec {
    /// Project name (`-n`)
    pub name: Option<String>,
    /// Output artifact name (`-o`)
    pub output: Option<String>,
    /// Explicit output kind (`--lib`, `--shared`)
    pub kind: Option<OutputKind>,
    /// Source paths, in command-line order
    pub sources: Vec<PathBuf>,
    /// Libraries to link (`-l`)
    pub libraries: Vec<String>,
    /// Preprocessor definitions (`-D`)
    pub defines: Vec<Define>,
    /// C compiler flags
    pub cflags: Vec<String>,
    /// C++ compiler flags
    pub cxxflags: Vec<String>,
    /// Linker flags
    pub ldflags: Vec<String>,
    /// Compilers written into the generated file
    pub toolchain: Toolchain,
    /// Include search paths (`-I`), highest priority first
    pub include_paths: Vec<PathBuf>,
    /// System include paths (`-isystem`)
    pub system_paths: Vec<PathBuf>,
    /// Library search paths (`-L`)
    pub library_paths: Vec<PathBuf>,
    /// Scan headers found only on system paths
    pub follow_system: bool,
}

impl ProjectSpec {
    /// Check the configuration before any file is opened.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.sources.is_empty() {
            return Err(ModelError::NoSources);
        }
        if matches!(&self.output, Some(o) if o.trim().is_empty()) {
            return Err(ModelError::EmptyOutputName);
        }
        Ok(())
    }

    /// Effective project name.
    pub fn project_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_PROJECT_NAME)
    }

    /// Effective output kind: explicit request, else inferred from `-o`.
    pub fn output_kind(&self) -> OutputKind {
        match (self.kind, &self.output) {
            (Some(kind), _) => kind,
            (None, Some(output)) => OutputKind::infer(output),
            (None, None) => OutputKind::Executable,
        }
    }

    /// Effective output name.
    pub fn output_name(&self) -> String {
        match &self.output {
            Some(output) => output.clone(),
            None => self.output_kind().default_output(self.project_name()),
        }
    }
}

/// The complete, read-only project handed to exactly one renderer.
#[derive(Debug, Clone)]
pub struct ProjectModel {
    pub name: String,
    pub output: String,
    pub kind: OutputKind,
    pub sources: Vec<SourceFile>,
    pub graph: DependencyGraph,
    pub libraries: Vec<String>,
    pub defines: Vec<Define>,
    pub cflags: Vec<String>,
    pub cxxflags: Vec<String>,
    pub ldflags: Vec<String>,
    pub toolchain: Toolchain,
    pub include_paths: Vec<PathBuf>,
    pub system_paths: Vec<PathBuf>,
    pub library_paths: Vec<PathBuf>,
}

impl ProjectModel {
    /// Merge a validated spec with the resolver output.
    pub fn assemble(
        spec: ProjectSpec,
        sources: Vec<SourceFile>,
        graph: DependencyGraph,
    ) -> Result<Self, ModelError> {
        spec.validate()?;

        let name = spec.project_name().to_string();
        let kind = spec.output_kind();
        let output = spec.output_name();

        Ok(ProjectModel {
            name,
            output,
            kind,
            sources: dedup_by(sources, |s| s.canonical.clone()),
            graph,
            libraries: dedup(spec.libraries),
            defines: dedup_defines(spec.defines),
            cflags: spec.cflags,
            cxxflags: spec.cxxflags,
            ldflags: spec.ldflags,
            toolchain: spec.toolchain,
            include_paths: dedup(spec.include_paths),
            system_paths: dedup(spec.system_paths),
            library_paths: dedup(spec.library_paths),
        })
    }

    /// Transitive header dependencies of a source, in sorted order.
    pub fn dependencies<'a>(&'a self, source: &SourceFile) -> impl Iterator<Item = &'a Path> + 'a {
        self.graph
            .dependencies(&source.canonical)
            .into_iter()
            .flatten()
            .map(PathBuf::as_path)
    }

    /// Sources that compile to object files.
    pub fn compiled_sources(&self) -> impl Iterator<Item = &SourceFile> {
        self.sources.iter().filter(|s| s.kind.is_compiled())
    }

    pub fn has_c(&self) -> bool {
        self.sources.iter().any(|s| s.kind == SourceKind::C)
    }

    pub fn has_cxx(&self) -> bool {
        self.sources.iter().any(|s| s.kind == SourceKind::Cxx)
    }

    /// `-l` flags in the order given.
    pub fn library_flags(&self) -> Vec<String> {
        self.libraries.iter().map(|l| format!("-l{}", l)).collect()
    }
}

fn dedup<T: Clone + Eq + std::hash::Hash>(items: Vec<T>) -> Vec<T> {
    dedup_by(items, T::clone)
}

fn dedup_by<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + std::hash::Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}

/// First definition of a name wins.
fn dedup_defines(defines: Vec<Define>) -> Vec<Define> {
    let mut kept: Vec<Define> = Vec::new();
    for define in defines {
        match kept.iter().find(|d| d.name == define.name) {
            Some(existing) if existing != &define => {
                tracing::warn!(
                    "ignoring `-D{}`: `{}` was already defined as `{}`",
                    define.to_assignment(),
                    define.name,
                    existing.to_assignment()
                );
            }
            Some(_) => {}
            None => kept.push(define),
        }
    }
    kept
}
