//! `makegen deps` command

use std::io::{self, Write};

use anyhow::{Context, Result};

use super::{load_settings, project_spec};
use crate::cli::{DepsArgs, DepsFormatArg};
use makegen::ops::deps::{format_deps, DepsFormat, DepsOptions};
use makegen::ops::generate::resolve_project;

pub fn execute(args: DepsArgs) -> Result<()> {
    let config = load_settings(&args.project)?;
    let spec = project_spec(&args.project, &config)?;
    let project = resolve_project(spec)?;

    let opts = DepsOptions {
        format: match args.format {
            DepsFormatArg::Text => DepsFormat::Text,
            DepsFormatArg::Json => DepsFormat::Json,
            DepsFormatArg::Dot => DepsFormat::Dot,
        },
        show_unresolved: args.unresolved,
    };

    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let report = format_deps(&project, &cwd, &opts)?;

    let mut out = io::stdout().lock();
    out.write_all(report.as_bytes())?;
    out.flush()?;

    Ok(())
}
