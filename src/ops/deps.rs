//! Implementation of `makegen deps`: print the resolved include graph.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;
use petgraph::dot::{Config as DotConfig, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use crate::core::project::ProjectModel;
use crate::render::RenderContext;

/// How `makegen deps` prints the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepsFormat {
    /// One line per source with its transitive headers
    #[default]
    Text,
    /// Machine-readable report
    Json,
    /// Graphviz digraph of direct include edges
    Dot,
}

/// Options for the deps command.
#[derive(Debug, Clone, Default)]
pub struct DepsOptions {
    pub format: DepsFormat,

    /// Also list includes that matched no file
    pub show_unresolved: bool,
}

/// Dependency report for a project.
#[derive(Debug, Clone, Serialize)]
pub struct DepsReport {
    pub sources: Vec<SourceDeps>,
}

/// One source and the headers it depends on.
#[derive(Debug, Clone, Serialize)]
pub struct SourceDeps {
    pub path: String,
    pub kind: &'static str,
    pub dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
}

/// Collect the report. Paths are relative to `base`.
pub fn deps_report(project: &ProjectModel, base: &Path, show_unresolved: bool) -> DepsReport {
    let ctx = RenderContext::new(base);

    let sources = project
        .sources
        .iter()
        .map(|source| SourceDeps {
            path: ctx.source(source),
            kind: source.kind.as_str(),
            dependencies: ctx.dependencies(project, source),
            unresolved: if show_unresolved {
                project
                    .graph
                    .unresolved(&source.canonical)
                    .iter()
                    .map(ToString::to_string)
                    .collect()
            } else {
                Vec::new()
            },
        })
        .collect();

    DepsReport { sources }
}

/// Render the project's dependency graph.
pub fn format_deps(project: &ProjectModel, base: &Path, opts: &DepsOptions) -> Result<String> {
    match opts.format {
        DepsFormat::Text => Ok(format_text(&deps_report(
            project,
            base,
            opts.show_unresolved,
        ))),
        DepsFormat::Json => {
            let report = deps_report(project, base, opts.show_unresolved);
            Ok(serde_json::to_string_pretty(&report)? + "\n")
        }
        DepsFormat::Dot => Ok(format_dot(project, base)),
    }
}

fn format_text(report: &DepsReport) -> String {
    let mut out = String::new();
    for source in &report.sources {
        if source.dependencies.is_empty() {
            writeln!(out, "{}:", source.path).unwrap();
        } else {
            writeln!(out, "{}: {}", source.path, source.dependencies.join(" ")).unwrap();
        }
        for include in &source.unresolved {
            writeln!(out, "  unresolved {}", include).unwrap();
        }
    }
    out
}

/// Graphviz rendering of direct include edges between every visited file.
fn format_dot(project: &ProjectModel, base: &Path) -> String {
    let ctx = RenderContext::new(base);
    let mut graph: DiGraph<String, &'static str> = DiGraph::new();
    let mut nodes: HashMap<&Path, NodeIndex> = HashMap::new();

    for source in &project.sources {
        add_node(&mut graph, &mut nodes, &ctx, &source.canonical);
    }
    for (from, to) in project.graph.edges() {
        let a = add_node(&mut graph, &mut nodes, &ctx, from);
        let b = add_node(&mut graph, &mut nodes, &ctx, to);
        graph.add_edge(a, b, "");
    }

    format!("{}", Dot::with_config(&graph, &[DotConfig::EdgeNoLabel]))
}

fn add_node<'a>(
    graph: &mut DiGraph<String, &'static str>,
    nodes: &mut HashMap<&'a Path, NodeIndex>,
    ctx: &RenderContext,
    path: &'a Path,
) -> NodeIndex {
    *nodes
        .entry(path)
        .or_insert_with(|| graph.add_node(ctx.path(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project::ProjectSpec;
    use crate::test_support::{model_for, TreeFixture};

    fn project() -> (TreeFixture, ProjectModel) {
        let tree = TreeFixture::new()
            .file("main.c", "#include <stdio.h>\n#include \"util.h\"\n")
            .file("util.h", "#include \"types.h\"\n")
            .file("types.h", "");
        let model = model_for(&tree, ProjectSpec::default(), &["main.c"]);
        (tree, model)
    }

    #[test]
    fn test_text_report() {
        let (tree, model) = project();
        let opts = DepsOptions {
            show_unresolved: true,
            ..Default::default()
        };

        let text = format_deps(&model, tree.root(), &opts).unwrap();
        assert_eq!(text, "main.c: types.h util.h\n  unresolved <stdio.h>\n");
    }

    #[test]
    fn test_unresolved_hidden_by_default() {
        let (tree, model) = project();
        let text = format_deps(&model, tree.root(), &DepsOptions::default()).unwrap();
        assert!(!text.contains("stdio.h"));
    }

    #[test]
    fn test_json_report() {
        let (tree, model) = project();
        let opts = DepsOptions {
            format: DepsFormat::Json,
            show_unresolved: true,
        };

        let json = format_deps(&model, tree.root(), &opts).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let source = &value["sources"][0];
        assert_eq!(source["path"], "main.c");
        assert_eq!(source["kind"], "c");
        assert_eq!(source["dependencies"], serde_json::json!(["types.h", "util.h"]));
        assert_eq!(source["unresolved"], serde_json::json!(["<stdio.h>"]));
    }

    #[test]
    fn test_dot_has_direct_edges_only() {
        let (tree, model) = project();
        let opts = DepsOptions {
            format: DepsFormat::Dot,
            ..Default::default()
        };

        let dot = format_deps(&model, tree.root(), &opts).unwrap();
        assert!(dot.starts_with("digraph {"));
        assert!(dot.contains("\"main.c\""));
        assert!(dot.contains("\"types.h\""));
        assert_eq!(dot.matches("->").count(), 2);
    }
}
