//! Implementation of `makegen gen`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::project::{ProjectModel, ProjectSpec};
use crate::render::{Format, RenderContext, RenderedFile};
use crate::resolver::{DependencyResolver, SearchPaths};
use crate::util::fs::{expand_sources, write_string};

/// Options for the generate command.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Output format
    pub format: Format,

    /// Directory the build files are written to
    pub out_dir: PathBuf,

    /// Return the rendered files without writing them
    pub to_stdout: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            format: Format::default(),
            out_dir: PathBuf::from("."),
            to_stdout: false,
        }
    }
}

/// Result of a generate run.
#[derive(Debug)]
pub struct GenerateResult {
    /// Rendered build files
    pub files: Vec<RenderedFile>,

    /// Paths written (empty when rendering to stdout)
    pub written: Vec<PathBuf>,

    /// Number of sources in the project
    pub sources: usize,

    /// Number of files read while resolving includes
    pub files_scanned: usize,
}

/// Expand sources, resolve includes and assemble the project model.
pub fn resolve_project(mut spec: ProjectSpec) -> Result<ProjectModel> {
    spec.sources = expand_sources(&spec.sources)?;
    spec.validate()?;

    let paths = SearchPaths::new(spec.include_paths.clone()).with_system(spec.system_paths.clone());
    let resolution = DependencyResolver::new(paths)
        .follow_system_headers(spec.follow_system)
        .resolve(&spec.sources)?;

    tracing::debug!(
        "{} sources, {} files scanned",
        resolution.sources.len(),
        resolution.graph.files_scanned()
    );

    Ok(ProjectModel::assemble(
        spec,
        resolution.sources,
        resolution.graph,
    )?)
}

/// Render a finished model in one format.
pub fn render_project(project: &ProjectModel, format: Format, out_dir: &Path) -> Vec<RenderedFile> {
    let renderer = format.renderer();
    let ctx = RenderContext::new(out_dir);
    tracing::debug!("rendering {} into {}", renderer.format(), ctx.base().display());
    renderer.render(project, &ctx)
}

/// Generate build files for a project.
///
/// The format is chosen by the caller, so an unknown format name is
/// rejected before any source is opened.
pub fn generate(spec: ProjectSpec, opts: &GenerateOptions) -> Result<GenerateResult> {
    let project = resolve_project(spec)?;
    let files = render_project(&project, opts.format, &opts.out_dir);

    let mut written = Vec::new();
    if !opts.to_stdout {
        for file in &files {
            let path = opts.out_dir.join(&file.name);
            write_string(&path, &file.contents)
                .with_context(|| format!("failed to write {}", file.name))?;
            tracing::info!("Wrote {}", path.display());
            written.push(path);
        }
    }

    Ok(GenerateResult {
        files,
        written,
        sources: project.sources.len(),
        files_scanned: project.graph.files_scanned(),
    })
}
