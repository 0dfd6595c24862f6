//! Configuration file support.
//!
//! Two locations are read:
//! - Global: `~/.makegen/config.toml` - user-wide defaults
//! - Project: `.makegen/config.toml` - overrides for one source tree
//!
//! Project config takes precedence over global config, and command-line
//! arguments take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::project::{Define, ModelError, ProjectSpec, Toolchain};

/// Compiler flags used when neither config nor CLI set any.
pub const DEFAULT_COMPILE_FLAGS: &[&str] = &["-g", "-Wall", "-O2"];

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Compilers and base flags
    pub toolchain: ToolchainSettings,

    /// Defaults for `makegen gen`
    pub generate: GenerateSettings,
}

/// Compiler names and base flags written into generated files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// C compiler (default `gcc`)
    pub cc: Option<String>,

    /// C++ compiler (default `g++`)
    pub cxx: Option<String>,

    /// Archiver for static libraries (default `ar`)
    pub ar: Option<String>,

    /// Base C flags (default `-g -Wall -O2`)
    pub cflags: Option<Vec<String>>,

    /// Base C++ flags (default `-g -Wall -O2`)
    pub cxxflags: Option<Vec<String>>,

    /// Base linker flags
    pub ldflags: Option<Vec<String>>,
}

/// Defaults for project generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateSettings {
    /// Output format (`make`, `cmake`, `automake`)
    pub format: Option<String>,

    /// Project name
    pub project_name: Option<String>,

    /// Output artifact name
    pub output: Option<String>,

    /// Include search paths, appended after `-I` arguments
    pub include_paths: Vec<PathBuf>,

    /// System include paths, appended after `--isystem` arguments
    pub system_paths: Vec<PathBuf>,

    /// Library search paths, appended after `-L` arguments
    pub library_paths: Vec<PathBuf>,

    /// Libraries, appended after `-l` arguments
    pub libraries: Vec<String>,

    /// Definitions (`NAME` or `NAME=VALUE`), appended after `-D` arguments
    pub defines: Vec<String>,

    /// Scan headers found on system paths
    pub follow_system_headers: Option<bool>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration, falling back to defaults if the file is missing
    /// or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    ///
    /// Scalars are replaced when set. Path and library lists are replaced
    /// when non-empty.
    pub fn merge(&mut self, other: Config) {
        let tc = other.toolchain;
        if tc.cc.is_some() {
            self.toolchain.cc = tc.cc;
        }
        if tc.cxx.is_some() {
            self.toolchain.cxx = tc.cxx;
        }
        if tc.ar.is_some() {
            self.toolchain.ar = tc.ar;
        }
        if tc.cflags.is_some() {
            self.toolchain.cflags = tc.cflags;
        }
        if tc.cxxflags.is_some() {
            self.toolchain.cxxflags = tc.cxxflags;
        }
        if tc.ldflags.is_some() {
            self.toolchain.ldflags = tc.ldflags;
        }

        let gen = other.generate;
        if gen.format.is_some() {
            self.generate.format = gen.format;
        }
        if gen.project_name.is_some() {
            self.generate.project_name = gen.project_name;
        }
        if gen.output.is_some() {
            self.generate.output = gen.output;
        }
        if !gen.include_paths.is_empty() {
            self.generate.include_paths = gen.include_paths;
        }
        if !gen.system_paths.is_empty() {
            self.generate.system_paths = gen.system_paths;
        }
        if !gen.library_paths.is_empty() {
            self.generate.library_paths = gen.library_paths;
        }
        if !gen.libraries.is_empty() {
            self.generate.libraries = gen.libraries;
        }
        if !gen.defines.is_empty() {
            self.generate.defines = gen.defines;
        }
        if gen.follow_system_headers.is_some() {
            self.generate.follow_system_headers = gen.follow_system_headers;
        }
    }

    /// Compilers with defaults filled in.
    pub fn toolchain(&self) -> Toolchain {
        let defaults = Toolchain::default();
        Toolchain {
            cc: self.toolchain.cc.clone().unwrap_or(defaults.cc),
            cxx: self.toolchain.cxx.clone().unwrap_or(defaults.cxx),
            ar: self.toolchain.ar.clone().unwrap_or(defaults.ar),
        }
    }

    /// Seed a project spec with the configured defaults.
    ///
    /// Relative paths in the config are kept as written; they are
    /// interpreted relative to the directory makegen runs in.
    pub fn project_spec(&self) -> Result<ProjectSpec, ModelError> {
        let defines = self
            .generate
            .defines
            .iter()
            .map(|d| Define::parse(d))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProjectSpec {
            name: self.generate.project_name.clone(),
            output: self.generate.output.clone(),
            libraries: self.generate.libraries.clone(),
            defines,
            cflags: base_flags(&self.toolchain.cflags),
            cxxflags: base_flags(&self.toolchain.cxxflags),
            ldflags: self.toolchain.ldflags.clone().unwrap_or_default(),
            toolchain: self.toolchain(),
            include_paths: self.generate.include_paths.clone(),
            system_paths: self.generate.system_paths.clone(),
            library_paths: self.generate.library_paths.clone(),
            follow_system: self.generate.follow_system_headers.unwrap_or(false),
            ..Default::default()
        })
    }
}

fn base_flags(configured: &Option<Vec<String>>) -> Vec<String> {
    match configured {
        Some(flags) => flags.clone(),
        None => DEFAULT_COMPILE_FLAGS.iter().map(|f| f.to_string()).collect(),
    }
}

/// Load merged configuration.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.makegen/config.toml)
/// 2. Global config (~/.makegen/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global) = global_path {
        config.merge(Config::load_or_default(global));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// The global config directory (`~/.makegen`).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".makegen"))
}

/// The global config file (`~/.makegen/config.toml`).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// The project config file (`.makegen/config.toml` under `root`).
pub fn project_config_path(root: &Path) -> PathBuf {
    root.join(".makegen").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
[toolchain]
cc = "clang"
cflags = ["-O0", "-g3"]

[generate]
format = "cmake"
project_name = "demo"
include_paths = ["include", "vendor/include"]
libraries = ["pthread", "m"]
defines = ["NDEBUG", "LEVEL=3"]
"#,
        )
        .unwrap();

        assert_eq!(config.toolchain.cc.as_deref(), Some("clang"));
        assert_eq!(config.generate.format.as_deref(), Some("cmake"));

        let spec = config.project_spec().unwrap();
        assert_eq!(spec.toolchain.cc, "clang");
        assert_eq!(spec.toolchain.cxx, "g++");
        assert_eq!(spec.cflags, vec!["-O0", "-g3"]);
        assert_eq!(spec.cxxflags, vec!["-g", "-Wall", "-O2"]);
        assert_eq!(spec.libraries, vec!["pthread", "m"]);
        assert_eq!(spec.defines[1].to_flag(), "-DLEVEL=3");
        assert_eq!(
            spec.include_paths,
            vec![PathBuf::from("include"), PathBuf::from("vendor/include")]
        );
    }

    #[test]
    fn test_defaults() {
        let spec = Config::default().project_spec().unwrap();
        assert_eq!(spec.toolchain, Toolchain::default());
        assert_eq!(spec.cflags, vec!["-g", "-Wall", "-O2"]);
        assert!(spec.ldflags.is_empty());
        assert!(!spec.follow_system);
    }

    #[test]
    fn test_invalid_define_in_config() {
        let mut config = Config::default();
        config.generate.defines = vec!["9LIVES".to_string()];
        assert!(matches!(
            config.project_spec(),
            Err(ModelError::InvalidDefine(_))
        ));
    }

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = project_config_path(tmp.path());

        std::fs::write(
            &global,
            "[toolchain]\ncc = \"clang\"\ncxx = \"clang++\"\n[generate]\nformat = \"cmake\"\n",
        )
        .unwrap();
        std::fs::create_dir_all(project.parent().unwrap()).unwrap();
        std::fs::write(&project, "[toolchain]\ncc = \"cc\"\n").unwrap();

        let config = load_config(Some(&global), &project);
        assert_eq!(config.toolchain.cc.as_deref(), Some("cc"));
        assert_eq!(config.toolchain.cxx.as_deref(), Some("clang++"));
        assert_eq!(config.generate.format.as_deref(), Some("cmake"));
    }

    #[test]
    fn test_broken_config_falls_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[toolchain\ncc = ").unwrap();

        assert!(Config::load(&path).is_err());
        assert_eq!(Config::load_or_default(&path), Config::default());
    }

    #[test]
    fn test_missing_files_give_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(None, &project_config_path(tmp.path()));
        assert_eq!(config, Config::default());
    }
}
