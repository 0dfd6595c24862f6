//! Core data types: sources, include targets and the project model.

pub mod header;
pub mod project;
pub mod source;

pub use header::{HeaderRef, IncludeStyle, ResolvedHeader, SearchOrigin};
pub use project::{Define, ModelError, OutputKind, ProjectModel, ProjectSpec, Toolchain};
pub use source::{SourceFile, SourceKind};
