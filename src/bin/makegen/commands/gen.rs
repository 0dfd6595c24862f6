//! `makegen gen` command

use std::io::{self, Write};

use anyhow::Result;

use super::{load_settings, prepend, project_spec};
use crate::cli::GenArgs;
use makegen::core::{Define, OutputKind};
use makegen::ops::generate::{generate, GenerateOptions};
use makegen::Format;

pub fn execute(args: GenArgs) -> Result<()> {
    let config = load_settings(&args.project)?;

    // Reject an unknown format before any source is opened.
    let format = args
        .format
        .as_deref()
        .or(config.generate.format.as_deref())
        .map(str::parse::<Format>)
        .transpose()?
        .unwrap_or_default();

    let mut spec = project_spec(&args.project, &config)?;

    if args.name.is_some() {
        spec.name = args.name;
    }
    if args.output.is_some() {
        spec.output = args.output;
    }
    if args.lib {
        spec.kind = Some(OutputKind::StaticLibrary);
    } else if args.shared {
        spec.kind = Some(OutputKind::SharedLibrary);
    }

    let defines = args
        .defines
        .iter()
        .map(|d| Define::parse(d))
        .collect::<Result<Vec<_>, _>>()?;
    spec.defines = prepend(&defines, spec.defines);
    spec.libraries = prepend(&args.libs, spec.libraries);
    spec.library_paths = prepend(&args.lib_dirs, spec.library_paths);

    // Extra flags go after the configured base flags.
    spec.cflags.extend(split_flags(args.cflags.as_deref()));
    spec.cxxflags.extend(split_flags(args.cxxflags.as_deref()));
    spec.ldflags.extend(split_flags(args.ldflags.as_deref()));

    let opts = GenerateOptions {
        format,
        out_dir: args.out_dir,
        to_stdout: args.stdout,
    };
    let result = generate(spec, &opts)?;

    if opts.to_stdout {
        let mut out = io::stdout().lock();
        let banner = result.files.len() > 1;
        for file in &result.files {
            if banner {
                writeln!(out, "# ==> {} <==", file.name)?;
            }
            out.write_all(file.contents.as_bytes())?;
        }
        out.flush()?;
    } else {
        tracing::info!(
            "Generated {} build for {} sources ({} files scanned)",
            format,
            result.sources,
            result.files_scanned
        );
    }

    Ok(())
}

fn split_flags(flags: Option<&str>) -> impl Iterator<Item = String> + '_ {
    flags
        .into_iter()
        .flat_map(str::split_whitespace)
        .map(str::to_string)
}
