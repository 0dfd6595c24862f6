//! Transitive include resolution.
//!
//! [`DependencyResolver`] walks the include graph depth-first from every
//! source, memoizing each file's transitive header set by canonical path.
//! Files currently on the walk stack act as the cycle sentinel: an include
//! that points back into the stack is recorded as a dependency but not
//! followed again.
//!
//! Files that include each other form a strongly connected component and
//! share one closure. Their memo entries are written together when the
//! first-entered file of the cycle finishes (Tarjan's low-link rule), so no
//! file is ever memoized with a partial set.
//!
//! Canonical paths are only the memo identity. Quoted includes are looked
//! up next to the path a file was reached through, so a symlinked source
//! sees the headers beside the link rather than beside its target.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::header::{HeaderRef, ResolvedHeader};
use crate::core::source::{SourceFile, SourceKind};
use crate::resolver::errors::ResolveError;
use crate::resolver::loader::{FsLoader, SourceLoader};
use crate::resolver::path::{PathResolver, SearchPaths};
use crate::resolver::scanner::IncludeScanner;

/// Low-link value of a file whose closure is final.
const FINISHED: usize = usize::MAX;

/// Resolved include graph.
///
/// Every path in the graph is canonical. Sets are ordered, so iteration is
/// deterministic for a fixed filesystem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    /// Canonical source paths, in input order
    sources: Vec<PathBuf>,
    /// Transitive header set of every visited file
    closures: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
    /// Direct include edges, in file order
    direct: BTreeMap<PathBuf, Vec<PathBuf>>,
    /// Includes that matched no search path
    unresolved: BTreeMap<PathBuf, Vec<HeaderRef>>,
    /// Number of files read and scanned
    files_scanned: usize,
}

impl DependencyGraph {
    /// Canonical source paths, in input order.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Transitive dependencies of a source or header.
    pub fn dependencies(&self, file: &Path) -> Option<&BTreeSet<PathBuf>> {
        self.closures.get(file)
    }

    /// Headers a file includes directly, in the order they appear.
    pub fn direct_includes(&self, file: &Path) -> &[PathBuf] {
        self.direct.get(file).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Includes of `file` that were dropped because no file matched.
    pub fn unresolved(&self, file: &Path) -> &[HeaderRef] {
        self.unresolved.get(file).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All direct edges.
    pub fn edges(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.direct
            .iter()
            .flat_map(|(from, tos)| tos.iter().map(move |to| (from.as_path(), to.as_path())))
    }

    /// Number of files read and scanned to build this graph.
    pub fn files_scanned(&self) -> usize {
        self.files_scanned
    }
}

/// Output of one resolution run.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Scanned sources, in input order
    pub sources: Vec<SourceFile>,
    /// The include graph
    pub graph: DependencyGraph,
}

/// Builds a [`DependencyGraph`] from a list of source files.
pub struct DependencyResolver<L = FsLoader> {
    paths: PathResolver,
    scanner: IncludeScanner,
    loader: L,
    follow_system: bool,
    state: WalkState,
}

/// Memo tables and the walk stack. Reset at the start of every `resolve`.
#[derive(Default)]
struct WalkState {
    memo: HashMap<PathBuf, BTreeSet<PathBuf>>,
    stack: Vec<PathBuf>,
    on_stack: HashMap<PathBuf, usize>,
    direct: BTreeMap<PathBuf, Vec<PathBuf>>,
    refs: HashMap<PathBuf, Vec<HeaderRef>>,
    unresolved: BTreeMap<PathBuf, Vec<HeaderRef>>,
    unreadable: HashMap<PathBuf, String>,
    required: HashSet<PathBuf>,
    files_scanned: usize,
}

impl DependencyResolver<FsLoader> {
    pub fn new(paths: SearchPaths) -> Self {
        DependencyResolver::with_loader(paths, FsLoader)
    }
}

impl<L: SourceLoader> DependencyResolver<L> {
    /// Create a resolver that reads files through `loader`.
    pub fn with_loader(paths: SearchPaths, loader: L) -> Self {
        DependencyResolver {
            paths: PathResolver::new(paths),
            scanner: IncludeScanner::new(),
            loader,
            follow_system: false,
            state: WalkState::default(),
        }
    }

    /// Also scan headers that were only found on system search paths.
    pub fn follow_system_headers(mut self, follow: bool) -> Self {
        self.follow_system = follow;
        self
    }

    /// Resolve the transitive header set of every source.
    ///
    /// Fails only if a source itself cannot be read. Missing or unreadable
    /// headers are dropped.
    pub fn resolve(&mut self, sources: &[PathBuf]) -> Result<Resolution, ResolveError> {
        self.state = WalkState::default();

        // Fail on bad inputs before scanning anything.
        let mut canonical = Vec::with_capacity(sources.len());
        for path in sources {
            let resolved = path
                .canonicalize()
                .map_err(|e| ResolveError::SourceUnreadable {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
            if !resolved.is_file() {
                return Err(ResolveError::NotAFile { path: path.clone() });
            }
            self.state.required.insert(resolved.clone());
            canonical.push(resolved);
        }

        let mut files = Vec::with_capacity(sources.len());
        let mut seen = HashSet::new();

        for (path, canonical) in sources.iter().zip(canonical) {
            if !seen.insert(canonical.clone()) {
                debug!("{} listed more than once", path.display());
                continue;
            }

            let mut sink = BTreeSet::new();
            self.visit(&canonical, parent_dir(path), &mut sink);

            if let Some(reason) = self.state.unreadable.get(&canonical) {
                return Err(ResolveError::SourceUnreadable {
                    path: path.clone(),
                    reason: reason.clone(),
                });
            }

            files.push(SourceFile {
                path: path.clone(),
                kind: SourceKind::from_path(path),
                includes: self.state.refs.get(&canonical).cloned().unwrap_or_default(),
                canonical,
            });
        }

        let state = std::mem::take(&mut self.state);
        debug!(
            "resolved {} sources, {} files scanned",
            files.len(),
            state.files_scanned
        );

        let graph = DependencyGraph {
            sources: files.iter().map(|f| f.canonical.clone()).collect(),
            closures: state.memo.into_iter().collect(),
            direct: state.direct,
            unresolved: state.unresolved,
            files_scanned: state.files_scanned,
        };

        Ok(Resolution {
            sources: files,
            graph,
        })
    }

    /// Visit `file`, adding its transitive headers to `acc`.
    ///
    /// `dir` is the directory `file` was reached through. Returns the lowest stack position reachable from `file`, or
    /// [`FINISHED`] once its closure is memoized.
    fn visit(&mut self, file: &Path, dir: &Path, acc: &mut BTreeSet<PathBuf>) -> usize {
        if let Some(done) = self.state.memo.get(file) {
            acc.extend(done.iter().cloned());
            return FINISHED;
        }

        if let Some(&pos) = self.state.on_stack.get(file) {
            debug!("include cycle back to {}", file.display());
            return pos;
        }

        let pos = self.state.stack.len();
        self.state.stack.push(file.to_path_buf());
        self.state.on_stack.insert(file.to_path_buf(), pos);

        let mut deps = BTreeSet::new();
        let mut low = pos;

        for header in self.scan(file, dir) {
            deps.insert(header.path.clone());
            low = low.min(self.visit(&header.path, header.including_dir(), &mut deps));
        }

        if low < pos {
            // Part of a cycle entered further down the stack; the entry file
            // memoizes the whole component.
            acc.extend(deps);
            return low;
        }

        for member in self.state.stack.drain(pos..) {
            self.state.on_stack.remove(&member);
            let mut own = deps.clone();
            own.remove(&member);
            self.state.memo.insert(member, own);
        }

        deps.remove(file);
        acc.extend(deps);
        FINISHED
    }

    /// Read and scan one file, returning its resolved direct includes.
    fn scan(&mut self, file: &Path, dir: &Path) -> Vec<ResolvedHeader> {
        let text = match self.loader.read(file) {
            Ok(text) => text,
            Err(e) => {
                if !self.state.required.contains(file) {
                    warn!("skipping unreadable header {}: {}", file.display(), e);
                }
                self.state
                    .unreadable
                    .insert(file.to_path_buf(), e.to_string());
                return Vec::new();
            }
        };
        self.state.files_scanned += 1;

        let output = self.scanner.scan_detailed(&text);
        for bad in &output.malformed {
            debug!(
                "{}:{}: skipping malformed include `{}`",
                file.display(),
                bad.line,
                bad.text
            );
        }

        let mut resolved: Vec<ResolvedHeader> = Vec::new();
        let mut unresolved = Vec::new();

        for include in &output.includes {
            match self.paths.resolve(include, dir) {
                Some(header) if header.origin.is_system() && !self.follow_system => {
                    debug!(
                        "{} found on system path {}, not tracked",
                        include,
                        header.path.display()
                    );
                }
                Some(header) => {
                    if !resolved.contains(&header) {
                        resolved.push(header);
                    }
                }
                None => unresolved.push(include.clone()),
            }
        }

        let file = file.to_path_buf();
        self.state.direct.insert(
            file.clone(),
            resolved.iter().map(|h| h.path.clone()).collect(),
        );
        if !unresolved.is_empty() {
            self.state.unresolved.insert(file.clone(), unresolved);
        }
        self.state.refs.insert(file, output.includes);

        resolved
    }
}

/// Directory of a path as spelled, `.` for a bare file name.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}
