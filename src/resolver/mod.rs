//! Include dependency resolution.
//!
//! [`PathResolver`] locates headers, [`IncludeScanner`] finds include
//! directives, and [`DependencyResolver`] combines the two into a
//! [`DependencyGraph`] mapping every source to its transitive headers.
//! Each file is read at most once per resolution.

pub mod errors;
pub mod graph;
pub mod loader;
pub mod path;
pub mod scanner;

pub use errors::ResolveError;
pub use graph::{DependencyGraph, DependencyResolver, Resolution};
pub use loader::{FsLoader, SourceLoader};
pub use path::{PathResolver, SearchPaths};
pub use scanner::{IncludeScanner, MalformedInclude, ScanOutput};
