//! Source tree fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::project::{ProjectModel, ProjectSpec};
use crate::resolver::{DependencyResolver, SearchPaths};

/// A temporary directory populated with source files.
///
/// ```rust,ignore
/// let tree = TreeFixture::new()
///     .file("main.c", "#include \"util.h\"\n")
///     .file("util.h", "");
/// ```
pub struct TreeFixture {
    dir: TempDir,
}

impl TreeFixture {
    pub fn new() -> Self {
        TreeFixture {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    /// Add a file, creating parent directories.
    pub fn file(self, rel: &str, contents: &str) -> Self {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture dirs");
        }
        fs::write(&path, contents).expect("write fixture file");
        self
    }

    /// Fixture root.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of a fixture-relative path.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }
}

impl Default for TreeFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve `sources` (fixture-relative) and assemble a model from `spec`.
pub fn model_for(tree: &TreeFixture, spec: ProjectSpec, sources: &[&str]) -> ProjectModel {
    let spec = ProjectSpec {
        sources: sources.iter().map(|s| tree.path(s)).collect(),
        ..spec
    };

    let paths = SearchPaths::new(spec.include_paths.clone()).with_system(spec.system_paths.clone());
    let resolution = DependencyResolver::new(paths)
        .follow_system_headers(spec.follow_system)
        .resolve(&spec.sources)
        .expect("resolve fixture sources");

    ProjectModel::assemble(spec, resolution.sources, resolution.graph).expect("assemble model")
}
