//! High-level operations.
//!
//! This module contains the implementation of makegen commands.

pub mod deps;
pub mod generate;

pub use deps::{deps_report, format_deps, DepsFormat, DepsOptions, DepsReport};
pub use generate::{generate, render_project, resolve_project, GenerateOptions, GenerateResult};
