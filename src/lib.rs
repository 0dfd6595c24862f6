//! makegen - build-file generator for C and C++
//!
//! This crate scans sources for `#include` directives, resolves the
//! transitive header set of every source, and renders the result as a
//! `Makefile`, `CMakeLists.txt` or `Makefile.am`/`configure.ac` pair.

pub mod core;
pub mod ops;
pub mod render;
pub mod resolver;
pub mod util;

/// Test utilities for makegen unit tests.
///
/// Only compiled for tests. Provides temporary source trees and a loader
/// that counts file reads.
#[cfg(test)]
pub mod test_support;

pub use core::{ProjectModel, ProjectSpec, SourceFile};
pub use render::{Format, Renderer};
pub use resolver::{DependencyGraph, DependencyResolver};
