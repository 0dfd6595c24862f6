//! Autoconf/Automake renderer: `Makefile.am` plus a minimal `configure.ac`.

use std::fmt::Write as _;
use std::path::Path;

use crate::core::project::{OutputKind, ProjectModel};
use crate::render::{
    join, warn_unknown_sources, Format, RenderContext, RenderedFile, Renderer, GENERATED_BANNER,
};

/// Version written into `AC_INIT`.
const INITIAL_VERSION: &str = "0.1.0";

/// Renders `Makefile.am` and `configure.ac`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutomakeRenderer;

impl Renderer for AutomakeRenderer {
    fn format(&self) -> Format {
        Format::Automake
    }

    fn render(&self, project: &ProjectModel, ctx: &RenderContext) -> Vec<RenderedFile> {
        warn_unknown_sources(project);
        vec![
            RenderedFile::new("Makefile.am", render_makefile_am(project, ctx)),
            RenderedFile::new("configure.ac", render_configure_ac(project)),
        ]
    }
}

/// Automake primary and product name for the output.
///
/// Shared libraries go through libtool, so `libfoo.so` becomes `libfoo.la`.
/// Library names that Automake would reject are rewritten to `lib<stem>`.
fn product(project: &ProjectModel) -> (&'static str, String) {
    let file = Path::new(&project.output)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(&project.output)
        .to_string();

    match project.kind {
        OutputKind::Executable => ("bin_PROGRAMS", file),
        OutputKind::StaticLibrary => ("lib_LIBRARIES", library_name(&file, "a")),
        OutputKind::SharedLibrary => ("lib_LTLIBRARIES", library_name(&file, "la")),
    }
}

/// `lib<stem>.<ext>` for an output file name.
fn library_name(file: &str, ext: &str) -> String {
    let stem = file.split('.').next().unwrap_or(file);
    let stem = stem.strip_prefix("lib").unwrap_or(stem);
    let name = format!("lib{}.{}", stem, ext);

    // libtool products are always renamed; only warn for archives.
    if ext == "a" && name != file {
        tracing::warn!(
            "Automake library names must look like `libNAME.a`; using `{}` for `{}`",
            name,
            file
        );
    }
    name
}

/// Automake canonical form of a product name: every character other than
/// letters, digits, `_` and `@` becomes `_`.
pub fn canonical_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '@' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn render_makefile_am(project: &ProjectModel, ctx: &RenderContext) -> String {
    let mut out = String::new();
    let (primary, product) = product(project);
    let var = canonical_name(&product);

    writeln!(out, "# {}", GENERATED_BANNER).unwrap();
    writeln!(out, "AUTOMAKE_OPTIONS = foreign").unwrap();
    out.push('\n');
    writeln!(out, "{} = {}", primary, product).unwrap();

    // Sources
    let files = ctx.sources_with_headers(project);
    write!(out, "{}_SOURCES =", var).unwrap();
    if files.is_empty() {
        out.push('\n');
    } else {
        out.push_str(" \\\n");
        let last = files.len() - 1;
        for (i, file) in files.iter().enumerate() {
            if i == last {
                writeln!(out, "\t{}", file).unwrap();
            } else {
                writeln!(out, "\t{} \\", file).unwrap();
            }
        }
    }

    // Flags
    let cpp_flags = ctx.preprocessor_flags(project);
    if !cpp_flags.is_empty() {
        writeln!(out, "{}_CPPFLAGS = {}", var, join(&cpp_flags)).unwrap();
    }
    if project.has_c() && !project.cflags.is_empty() {
        writeln!(out, "{}_CFLAGS = {}", var, join(&project.cflags)).unwrap();
    }
    if project.has_cxx() && !project.cxxflags.is_empty() {
        writeln!(out, "{}_CXXFLAGS = {}", var, join(&project.cxxflags)).unwrap();
    }

    // Linking; static archives are never linked
    if project.kind != OutputKind::StaticLibrary {
        let mut ldflags = ctx.library_path_flags(project);
        ldflags.extend(project.ldflags.iter().cloned());
        if !ldflags.is_empty() {
            writeln!(out, "{}_LDFLAGS = {}", var, join(&ldflags)).unwrap();
        }

        let libs = project.library_flags();
        if !libs.is_empty() {
            let adder = match project.kind {
                OutputKind::SharedLibrary => "LIBADD",
                _ => "LDADD",
            };
            writeln!(out, "{}_{} = {}", var, adder, join(&libs)).unwrap();
        }
    }

    out
}

fn render_configure_ac(project: &ProjectModel) -> String {
    let mut out = String::new();

    writeln!(out, "dnl {}", GENERATED_BANNER).unwrap();
    writeln!(out, "AC_INIT([{}], [{}])", project.name, INITIAL_VERSION).unwrap();
    writeln!(out, "AM_INIT_AUTOMAKE([foreign])").unwrap();
    if project.has_c() || !project.has_cxx() {
        writeln!(out, "AC_PROG_CC").unwrap();
    }
    if project.has_cxx() {
        writeln!(out, "AC_PROG_CXX").unwrap();
    }

    match project.kind {
        OutputKind::Executable => {}
        OutputKind::StaticLibrary => {
            writeln!(out, "AM_PROG_AR").unwrap();
            writeln!(out, "AC_PROG_RANLIB").unwrap();
        }
        OutputKind::SharedLibrary => {
            writeln!(out, "AM_PROG_AR").unwrap();
            writeln!(out, "LT_INIT").unwrap();
        }
    }

    for lib in &project.libraries {
        writeln!(
            out,
            "AC_CHECK_LIB([{}], [main], [], [AC_MSG_WARN([library {} not found])])",
            lib, lib
        ).unwrap();
    }

    writeln!(out, "AC_CONFIG_FILES([Makefile])").unwrap();
    writeln!(out, "AC_OUTPUT").unwrap();

    out
}
