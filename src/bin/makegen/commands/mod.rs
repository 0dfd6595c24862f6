//! Command implementations

pub mod completions;
pub mod deps;
pub mod gen;

use anyhow::{Context, Result};

use crate::cli::ProjectArgs;
use makegen::util::config::{global_config_path, load_config, project_config_path};
use makegen::util::Config;
use makegen::ProjectSpec;

/// Load configuration: global, then project (or `--config`).
pub fn load_settings(args: &ProjectArgs) -> Result<Config> {
    let global = global_config_path();

    match &args.config {
        Some(path) => {
            let mut config = Config::default();
            if let Some(global) = &global {
                config.merge(Config::load_or_default(global));
            }
            // An explicit config file must exist.
            config.merge(Config::load(path)?);
            Ok(config)
        }
        None => {
            let cwd = std::env::current_dir().context("failed to get current directory")?;
            Ok(load_config(global.as_deref(), &project_config_path(&cwd)))
        }
    }
}

/// Seed a project spec from config, then apply the shared arguments.
///
/// Command-line search paths come before configured ones.
pub fn project_spec(args: &ProjectArgs, config: &Config) -> Result<ProjectSpec> {
    let mut spec = config.project_spec()?;

    spec.sources = args.files.clone();
    spec.include_paths = prepend(&args.include, spec.include_paths);
    spec.system_paths = prepend(&args.isystem, spec.system_paths);
    spec.follow_system |= args.follow_system;

    Ok(spec)
}

pub fn prepend<T: Clone>(first: &[T], rest: Vec<T>) -> Vec<T> {
    let mut out = first.to_vec();
    out.extend(rest);
    out
}
