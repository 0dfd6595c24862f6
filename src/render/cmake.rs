//! `CMakeLists.txt` renderer.
//!
//! CMake tracks header dependencies itself, so the graph is only used to
//! list headers next to sources (they show up in IDEs that way).

use std::fmt::Write as _;
use std::path::Path;

use crate::core::project::{OutputKind, ProjectModel};
use crate::render::{
    warn_unknown_sources, Format, RenderContext, RenderedFile, Renderer, GENERATED_BANNER,
};

/// Oldest CMake that understands every command emitted here
/// (`target_link_directories`, `target_link_options`).
const CMAKE_MINIMUM: &str = "3.13";

/// Renders `CMakeLists.txt`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CMakeRenderer;

impl Renderer for CMakeRenderer {
    fn format(&self) -> Format {
        Format::CMake
    }

    fn render(&self, project: &ProjectModel, ctx: &RenderContext) -> Vec<RenderedFile> {
        warn_unknown_sources(project);
        vec![RenderedFile::new("CMakeLists.txt", render_lists(project, ctx))]
    }
}

/// Target name for an output file: `libfoo.a` becomes `foo`, executables
/// keep their file name.
pub fn target_name(output: &str, kind: OutputKind) -> String {
    let file = Path::new(output)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(output);

    if !kind.is_library() {
        return file.to_string();
    }

    let stem = file.split('.').next().unwrap_or(file);
    let name = stem.strip_prefix("lib").unwrap_or(stem);
    if name.is_empty() {
        stem.to_string()
    } else {
        name.to_string()
    }
}

fn render_lists(project: &ProjectModel, ctx: &RenderContext) -> String {
    let mut out = String::new();
    let target = target_name(&project.output, project.kind);

    writeln!(out, "# {}", GENERATED_BANNER).unwrap();
    writeln!(out, "cmake_minimum_required(VERSION {})", CMAKE_MINIMUM).unwrap();

    let mut languages = Vec::new();
    if project.has_c() || !project.has_cxx() {
        languages.push("C");
    }
    if project.has_cxx() {
        languages.push("CXX");
    }
    writeln!(
        out,
        "project({} LANGUAGES {})",
        cmake_arg(&project.name),
        languages.join(" ")
    ).unwrap();
    out.push('\n');

    let command = match project.kind {
        OutputKind::Executable => format!("add_executable({}", cmake_arg(&target)),
        OutputKind::StaticLibrary => format!("add_library({} STATIC", cmake_arg(&target)),
        OutputKind::SharedLibrary => format!("add_library({} SHARED", cmake_arg(&target)),
    };
    writeln!(out, "{}", command).unwrap();
    for file in ctx.sources_with_headers(project) {
        writeln!(out, "\t{}", cmake_arg(&file)).unwrap();
    }
    writeln!(out, ")").unwrap();

    let target = cmake_arg(&target);

    block(
        &mut out,
        &format!("target_include_directories({} PRIVATE", target),
        project.include_paths.iter().map(|p| ctx.path(p)),
    );
    block(
        &mut out,
        &format!("target_include_directories({} SYSTEM PRIVATE", target),
        project.system_paths.iter().map(|p| ctx.path(p)),
    );
    block(
        &mut out,
        &format!("target_compile_definitions({} PRIVATE", target),
        project.defines.iter().map(|d| d.to_assignment()),
    );

    let mut options = Vec::new();
    if project.has_c() {
        options.extend(
            project
                .cflags
                .iter()
                .map(|f| format!("$<$<COMPILE_LANGUAGE:C>:{}>", f)),
        );
    }
    if project.has_cxx() {
        options.extend(
            project
                .cxxflags
                .iter()
                .map(|f| format!("$<$<COMPILE_LANGUAGE:CXX>:{}>", f)),
        );
    }
    block(
        &mut out,
        &format!("target_compile_options({} PRIVATE", target),
        options.into_iter(),
    );

    block(
        &mut out,
        &format!("target_link_directories({} PRIVATE", target),
        project.library_paths.iter().map(|p| ctx.path(p)),
    );
    block(
        &mut out,
        &format!("target_link_options({} PRIVATE", target),
        project.ldflags.iter().cloned(),
    );
    block(
        &mut out,
        &format!("target_link_libraries({} PRIVATE", target),
        project.libraries.iter().cloned(),
    );

    out
}

/// Write `head` followed by one argument per line, if there are any.
fn block(out: &mut String, head: &str, args: impl Iterator<Item = String>) {
    let args: Vec<String> = args.collect();
    if args.is_empty() {
        return;
    }

    out.push('\n');
    writeln!(out, "{}", head).unwrap();
    for arg in args {
        writeln!(out, "\t{}", cmake_arg(&arg)).unwrap();
    }
    writeln!(out, ")").unwrap();
}

/// Quote an argument if CMake would otherwise split or expand it.
fn cmake_arg(arg: &str) -> String {
    let plain = !arg.is_empty()
        && !arg
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '(' | ')' | '#' | ';' | '\\'));
    if plain {
        arg.to_string()
    } else {
        format!("\"{}\"", arg.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project::{Define, ProjectSpec};
    use crate::test_support::{model_for, TreeFixture};

    fn lists(project: &ProjectModel, tree: &TreeFixture) -> String {
        let files = CMakeRenderer.render(project, &RenderContext::new(tree.root()));
        assert_eq!(files[0].name, "CMakeLists.txt");
        files[0].contents.clone()
    }

    #[test]
    fn test_target_names() {
        assert_eq!(target_name("app", OutputKind::Executable), "app");
        assert_eq!(target_name("bin/app", OutputKind::Executable), "app");
        assert_eq!(target_name("libzip.a", OutputKind::StaticLibrary), "zip");
        assert_eq!(target_name("libzip.so.1", OutputKind::SharedLibrary), "zip");
        assert_eq!(target_name("lib.a", OutputKind::StaticLibrary), "lib");
    }

    #[test]
    fn test_executable_lists_sources_and_headers() {
        let tree = TreeFixture::new()
            .file("main.c", "#include \"util.h\"\n")
            .file("util.h", "#include <stdio.h>\n");

        let spec = ProjectSpec {
            name: Some("demo".into()),
            output: Some("demo".into()),
            libraries: vec!["pthread".into(), "m".into()],
            defines: vec![
                Define::parse("DEBUG").unwrap(),
                Define::parse("LEVEL=2").unwrap(),
            ],
            cflags: vec!["-Wall".into()],
            ..Default::default()
        };
        let project = model_for(&tree, spec, &["main.c"]);
        let text = lists(&project, &tree);

        assert!(text.contains("cmake_minimum_required(VERSION 3.13)\n"));
        assert!(text.contains("project(demo LANGUAGES C)\n"));
        assert!(text.contains("add_executable(demo\n\tmain.c\n\tutil.h\n)\n"));
        assert!(text.contains("target_compile_definitions(demo PRIVATE\n\tDEBUG\n\tLEVEL=2\n)\n"));
        assert!(text.contains("\t$<$<COMPILE_LANGUAGE:C>:-Wall>\n"));
        assert!(text.contains("target_link_libraries(demo PRIVATE\n\tpthread\n\tm\n)\n"));
        assert!(!text.contains("target_include_directories"));
    }

    #[test]
    fn test_static_library() {
        let tree = TreeFixture::new()
            .file("src/zip.cpp", "#include <zip.h>\n")
            .file("include/zip.h", "");

        let spec = ProjectSpec {
            output: Some("libzip.a".into()),
            include_paths: vec![tree.path("include")],
            ..Default::default()
        };
        let project = model_for(&tree, spec, &["src/zip.cpp"]);
        let text = lists(&project, &tree);

        assert!(text.contains("project(my_project LANGUAGES CXX)\n"));
        assert!(text.contains("add_library(zip STATIC\n\tsrc/zip.cpp\n\tinclude/zip.h\n)\n"));
        assert!(text.contains("target_include_directories(zip PRIVATE\n\tinclude\n)\n"));
    }

    #[test]
    fn test_arguments_with_spaces_are_quoted() {
        assert_eq!(cmake_arg("plain/path.c"), "plain/path.c");
        assert_eq!(cmake_arg("my dir/a.c"), "\"my dir/a.c\"");
        assert_eq!(cmake_arg("MSG=\"hi\""), "\"MSG=\\\"hi\\\"\"");
    }
}
