//! Plain `Makefile` renderer.
//!
//! Every object gets an explicit rule listing its source and the full
//! transitive header set, so `make` rebuilds exactly the objects whose
//! headers changed.

use std::fmt::Write as _;

use crate::core::project::{OutputKind, ProjectModel};
use crate::core::source::SourceKind;
use crate::render::{join, warn_unknown_sources, Format, RenderContext, RenderedFile, Renderer, GENERATED_BANNER};

/// Renders `Makefile`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRenderer;

impl Renderer for MakeRenderer {
    fn format(&self) -> Format {
        Format::Make
    }

    fn render(&self, project: &ProjectModel, ctx: &RenderContext) -> Vec<RenderedFile> {
        warn_unknown_sources(project);
        vec![RenderedFile::new("Makefile", render_makefile(project, ctx))]
    }
}

fn render_makefile(project: &ProjectModel, ctx: &RenderContext) -> String {
    let mut out = String::new();
    let objects = ctx.objects(project);
    let output = &project.output;
    let pic = project.kind == OutputKind::SharedLibrary;

    let mut cpp_flags = ctx.preprocessor_flags(project);
    if pic {
        cpp_flags.push("-fPIC".to_string());
    }

    writeln!(out, "# {}", GENERATED_BANNER).unwrap();
    writeln!(out, "# Project: {}", project.name).unwrap();
    out.push('\n');

    // Variables
    if project.has_c() {
        writeln!(out, "CC={}", project.toolchain.cc).unwrap();
        writeln!(out, "CFLAGS={}", flags_line(&project.cflags, &cpp_flags)).unwrap();
    }
    if project.has_cxx() {
        writeln!(out, "CXX={}", project.toolchain.cxx).unwrap();
        writeln!(out, "CXXFLAGS={}", flags_line(&project.cxxflags, &cpp_flags)).unwrap();
    }
    if project.kind == OutputKind::StaticLibrary {
        writeln!(out, "AR={}", project.toolchain.ar).unwrap();
    }
    if !objects.is_empty() {
        writeln!(out, "OBJS={}", join(&objects)).unwrap();
        let mut ldflags = ctx.library_path_flags(project);
        ldflags.extend(project.ldflags.iter().cloned());
        writeln!(out, "LDFLAGS={}", join(&ldflags)).unwrap();
        writeln!(out, "LDLIBS={}", join(&project.library_flags())).unwrap();
    }
    out.push('\n');

    writeln!(out, ".PHONY: all clean").unwrap();
    out.push('\n');

    // Output artifact
    if objects.is_empty() {
        writeln!(out, "all:").unwrap();
        out.push('\n');
    } else {
        writeln!(out, "all: {}", output).unwrap();
        out.push('\n');

        let linker = if project.has_cxx() { "$(CXX)" } else { "$(CC)" };
        writeln!(out, "{}: $(OBJS)", output).unwrap();
        match project.kind {
            OutputKind::Executable => {
                writeln!(out, "\t{} -o {} $(OBJS) $(LDFLAGS) $(LDLIBS)", linker, output).unwrap();
            }
            OutputKind::StaticLibrary => {
                writeln!(out, "\t$(AR) rcs {} $(OBJS)", output).unwrap();
            }
            OutputKind::SharedLibrary => {
                writeln!(
                    out,
                    "\t{} -shared -o {} $(OBJS) $(LDFLAGS) $(LDLIBS)",
                    linker, output
                ).unwrap();
            }
        }
        out.push('\n');
    }

    // Object files
    for source in project.compiled_sources() {
        let Some(object) = ctx.object(source) else {
            continue;
        };
        let file = ctx.source(source);

        let mut prerequisites = vec![file.clone()];
        prerequisites.extend(ctx.dependencies(project, source));

        let (compiler, flags) = match source.kind {
            SourceKind::Cxx => ("$(CXX)", "$(CXXFLAGS)"),
            _ => ("$(CC)", "$(CFLAGS)"),
        };

        writeln!(out, "{}: {}", object, join(&prerequisites)).unwrap();
        writeln!(out, "\t{} {} -c -o {} {}", compiler, flags, object, file).unwrap();
        out.push('\n');
    }

    // Clean
    writeln!(out, "clean:").unwrap();
    if !objects.is_empty() {
        writeln!(out, "\trm -f $(OBJS) {}", output).unwrap();
    }

    out
}

fn flags_line(base: &[String], cpp_flags: &[String]) -> String {
    let mut flags = base.to_vec();
    flags.extend(cpp_flags.iter().cloned());
    join(&flags)
}
