//! Text and JSON renderings of descriptor graphs.

use std::collections::HashSet;

use anyhow::{Context, Result};

use crate::core::{PackageGraph, PackageId, TargetId};
use crate::registry::PackageRegistry;

/// Options for `render_tree`.
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    /// Stop descending below this depth
    pub max_depth: Option<usize>,

    /// Expand packages that were already printed instead of marking them `(*)`
    pub show_duplicates: bool,
}

/// Render the sub-package tree of the graph's root.
pub fn render_tree(graph: &PackageGraph, opts: &TreeOptions) -> String {
    let mut output = String::new();
    let mut seen: HashSet<PackageId> = HashSet::new();

    // (package, prefix for its own line, prefix for its children, depth)
    let mut stack = vec![(graph.root(), String::new(), String::new(), 0usize)];

    while let Some((id, line_prefix, child_prefix, depth)) = stack.pop() {
        let is_duplicate = !seen.insert(id);
        let collapse = is_duplicate && !opts.show_duplicates;

        output.push_str(&format!(
            "{}{}{}\n",
            line_prefix,
            graph.package(id),
            if collapse { " (*)" } else { "" }
        ));

        if collapse || opts.max_depth.is_some_and(|max| depth >= max) {
            continue;
        }

        let subs = graph.sub_packages(id);
        // pushed in reverse so the first sub-package is printed first
        for (i, &sub) in subs.iter().enumerate().rev() {
            let last = i + 1 == subs.len();
            let (branch, rest) = if last {
                ("└── ", "    ")
            } else {
                ("├── ", "│   ")
            };
            stack.push((
                sub,
                format!("{}{}", child_prefix, branch),
                format!("{}{}", child_prefix, rest),
                depth + 1,
            ));
        }
    }

    output
}

/// Render every target with its kind, namespace and dependency edges,
/// packages in build order.
pub fn render_targets(graph: &PackageGraph) -> String {
    let mut output = String::new();

    for &pkg in graph.build_order() {
        let targets: Vec<TargetId> = graph
            .main_lib(pkg)
            .into_iter()
            .chain(graph.unittests(pkg).iter().copied())
            .collect();

        for id in targets {
            let target = graph.target(id);
            output.push_str(&format!(
                "{} [{}] {}\n",
                graph.label(id),
                target.kind(),
                target.namespace()
            ));
            for &dep in target.dependencies() {
                output.push_str(&format!("    -> {}\n", graph.label(dep)));
            }
        }
    }

    output
}

/// Render the graph as pretty-printed JSON.
pub fn render_json(graph: &PackageGraph) -> Result<String> {
    serde_json::to_string_pretty(graph).context("failed to serialize package graph")
}

/// Render the declared packages of a registry.
pub fn render_list(registry: &PackageRegistry) -> String {
    let mut output = String::new();

    for decl in registry.packages() {
        output.push_str(&format!("{} ({})\n", decl.name(), decl.namespace()));
        if !decl.dependencies().is_empty() {
            output.push_str(&format!("    dependencies: {}\n", decl.dependencies().join(", ")));
        }
        if !decl.test_dependencies().is_empty() {
            output.push_str(&format!(
                "    test-dependencies: {}\n",
                decl.test_dependencies().join(", ")
            ));
        }
    }

    output
}
