//! Header lookup across include search paths.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::header::{HeaderRef, IncludeStyle, ResolvedHeader, SearchOrigin};

/// Include search configuration, in priority order.
#[derive(Debug, Clone, Default)]
pub struct SearchPaths {
    /// `-I` directories; earlier entries win
    pub include: Vec<PathBuf>,
    /// `-isystem` directories, searched after `include`
    pub system: Vec<PathBuf>,
}

impl SearchPaths {
    pub fn new(include: Vec<PathBuf>) -> Self {
        SearchPaths {
            include,
            system: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: Vec<PathBuf>) -> Self {
        self.system = system;
        self
    }
}

/// Finds the file an include directive refers to.
///
/// Quoted includes look in the including file's directory first, then in
/// the search paths. Angle includes only look in the search paths. The first
/// regular file found wins and is canonicalized, so different spellings of
/// one file resolve to the same [`ResolvedHeader`].
#[derive(Debug, Clone)]
pub struct PathResolver {
    paths: SearchPaths,
}

impl PathResolver {
    pub fn new(paths: SearchPaths) -> Self {
        PathResolver { paths }
    }

    /// Locate `header`. `None` means it is not on any searched directory,
    /// which is expected for system headers and never an error.
    pub fn resolve(&self, header: &HeaderRef, including_dir: &Path) -> Option<ResolvedHeader> {
        let target = Path::new(&header.name);

        if target.is_absolute() {
            return canonical_file(target).map(|path| ResolvedHeader {
                path,
                found_at: target.to_path_buf(),
                origin: SearchOrigin::Absolute,
            });
        }

        let local = match header.style {
            IncludeStyle::Quoted => Some((including_dir, SearchOrigin::IncludingDir)),
            IncludeStyle::Angle => None,
        };

        let include = self
            .paths
            .include
            .iter()
            .enumerate()
            .map(|(i, dir)| (dir.as_path(), SearchOrigin::IncludePath(i)));

        let system = self
            .paths
            .system
            .iter()
            .enumerate()
            .map(|(i, dir)| (dir.as_path(), SearchOrigin::SystemPath(i)));

        for (dir, origin) in local.into_iter().chain(include).chain(system) {
            let candidate = dir.join(target);
            if let Some(path) = canonical_file(&candidate) {
                debug!("resolved {} to {} ({:?})", header, path.display(), origin);
                return Some(ResolvedHeader {
                    path,
                    found_at: candidate,
                    origin,
                });
            }
        }

        debug!("could not resolve {}", header);
        None
    }
}

fn canonical_file(candidate: &Path) -> Option<PathBuf> {
    if candidate.is_file() {
        candidate.canonicalize().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_quoted_prefers_including_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("dir");
        let inc = tmp.path().join("inc");
        touch(&dir.join("b.h"));
        touch(&inc.join("b.h"));

        let resolver = PathResolver::new(SearchPaths::new(vec![inc.clone()]));
        let found = resolver.resolve(&HeaderRef::quoted("b.h"), &dir).unwrap();

        assert_eq!(found.path, dir.join("b.h").canonicalize().unwrap());
        assert_eq!(found.origin, SearchOrigin::IncludingDir);
    }

    #[test]
    fn test_found_at_keeps_spelling() {
        let tmp = TempDir::new().unwrap();
        let inc = tmp.path().join("inc");
        touch(&inc.join("sub/x.h"));

        let resolver = PathResolver::new(SearchPaths::new(vec![inc.join("sub/..")]));
        let found = resolver.resolve(&HeaderRef::angle("sub/x.h"), tmp.path()).unwrap();

        assert_eq!(found.found_at, inc.join("sub/..").join("sub/x.h"));
        assert_eq!(found.path, inc.join("sub/x.h").canonicalize().unwrap());
        assert_eq!(found.including_dir(), inc.join("sub/../sub"));
    }

    #[test]
    fn test_angle_skips_including_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("dir");
        let inc = tmp.path().join("inc");
        touch(&dir.join("b.h"));
        touch(&inc.join("b.h"));

        let resolver = PathResolver::new(SearchPaths::new(vec![inc.clone()]));
        let found = resolver.resolve(&HeaderRef::angle("b.h"), &dir).unwrap();

        assert_eq!(found.path, inc.join("b.h").canonicalize().unwrap());
        assert_eq!(found.origin, SearchOrigin::IncludePath(0));

        let only_local = PathResolver::new(SearchPaths::default());
        assert!(only_local.resolve(&HeaderRef::angle("b.h"), &dir).is_none());
    }

    #[test]
    fn test_search_order_is_insertion_order() {
        let tmp = TempDir::new().unwrap();
        let first = tmp.path().join("first");
        let second = tmp.path().join("second");
        touch(&first.join("cfg.h"));
        touch(&second.join("cfg.h"));
        touch(&second.join("only_second.h"));

        let resolver = PathResolver::new(SearchPaths::new(vec![first.clone(), second.clone()]));

        let found = resolver.resolve(&HeaderRef::angle("cfg.h"), tmp.path()).unwrap();
        assert_eq!(found.path, first.join("cfg.h").canonicalize().unwrap());

        let found = resolver
            .resolve(&HeaderRef::angle("only_second.h"), tmp.path())
            .unwrap();
        assert_eq!(found.origin, SearchOrigin::IncludePath(1));

        let swapped = PathResolver::new(SearchPaths::new(vec![second.clone(), first]));
        let found = swapped.resolve(&HeaderRef::angle("cfg.h"), tmp.path()).unwrap();
        assert_eq!(found.path, second.join("cfg.h").canonicalize().unwrap());
    }

    #[test]
    fn test_system_paths_searched_last() {
        let tmp = TempDir::new().unwrap();
        let inc = tmp.path().join("inc");
        let sys = tmp.path().join("sys");
        touch(&inc.join("a.h"));
        touch(&sys.join("a.h"));
        touch(&sys.join("b.h"));

        let resolver =
            PathResolver::new(SearchPaths::new(vec![inc]).with_system(vec![sys.clone()]));

        let a = resolver.resolve(&HeaderRef::angle("a.h"), tmp.path()).unwrap();
        assert_eq!(a.origin, SearchOrigin::IncludePath(0));

        let b = resolver.resolve(&HeaderRef::angle("b.h"), tmp.path()).unwrap();
        assert_eq!(b.origin, SearchOrigin::SystemPath(0));
        assert!(b.origin.is_system());
    }

    #[test]
    fn test_not_found_is_none() {
        let tmp = TempDir::new().unwrap();
        let resolver = PathResolver::new(SearchPaths::new(vec![tmp.path().to_path_buf()]));
        assert!(resolver
            .resolve(&HeaderRef::angle("nonexistent.h"), tmp.path())
            .is_none());
    }

    #[test]
    fn test_directories_do_not_match() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("looks_like.h")).unwrap();

        let resolver = PathResolver::new(SearchPaths::default());
        assert!(resolver
            .resolve(&HeaderRef::quoted("looks_like.h"), tmp.path())
            .is_none());
    }

    #[test]
    fn test_spellings_collapse_to_one_identity() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let inc = tmp.path().join("include");
        touch(&inc.join("common.h"));
        fs::create_dir_all(&src).unwrap();

        let resolver = PathResolver::new(SearchPaths::new(vec![inc.clone()]));
        let via_path = resolver.resolve(&HeaderRef::angle("common.h"), &src).unwrap();
        let via_dotdot = resolver
            .resolve(&HeaderRef::quoted("../include/./common.h"), &src)
            .unwrap();

        assert_eq!(via_path, via_dotdot);
        assert_eq!(via_path.path, via_dotdot.path);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_canonicalized() {
        let tmp = TempDir::new().unwrap();
        let real = tmp.path().join("real");
        touch(&real.join("x.h"));
        std::os::unix::fs::symlink(&real, tmp.path().join("link")).unwrap();

        let resolver = PathResolver::new(SearchPaths::default());
        let via_link = resolver
            .resolve(&HeaderRef::quoted("link/x.h"), tmp.path())
            .unwrap();
        let direct = resolver
            .resolve(&HeaderRef::quoted("real/x.h"), tmp.path())
            .unwrap();

        assert_eq!(via_link.path, direct.path);
    }
}
