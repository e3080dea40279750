//! `sdkgraph tree` command

use std::collections::HashSet;

use anyhow::{bail, Result};

use crate::cli::{GlobalArgs, TreeArgs};
use sdkgraph::core::{ProjectGraph, ProjectName};
use sdkgraph::ops::load_references;

pub fn execute(global: &GlobalArgs, args: TreeArgs) -> Result<()> {
    let ws = super::workspace(global, None)?;
    let graph = load_references(&ws)?;

    let start = match &args.project {
        Some(query) => match graph.find(query) {
            Some(project) => project.name().clone(),
            None => bail!("project `{}` not found in the graph rooted at {}", query, graph.root()),
        },
        None => graph.root().clone(),
    };

    let mut seen = HashSet::new();
    print_tree(
        &graph,
        &start,
        0,
        args.depth.unwrap_or(usize::MAX),
        &mut seen,
        args.duplicates,
    );

    Ok(())
}

fn print_tree(
    graph: &ProjectGraph,
    name: &ProjectName,
    depth: usize,
    max_depth: usize,
    seen: &mut HashSet<ProjectName>,
    show_duplicates: bool,
) {
    if depth > max_depth {
        return;
    }

    let is_duplicate = !seen.insert(name.clone());

    let prefix = if depth == 0 {
        String::new()
    } else {
        format!("{}├── ", "│   ".repeat(depth - 1))
    };

    let dup_marker = if is_duplicate && !show_duplicates {
        " (*)"
    } else {
        ""
    };

    let tfm = graph
        .get(name)
        .map(|p| format!(" [{}]", p.target_framework()))
        .unwrap_or_default();

    println!("{}{}{}{}", prefix, name, tfm, dup_marker);

    // Don't recurse into duplicates unless explicitly requested
    if is_duplicate && !show_duplicates {
        return;
    }

    for reference in graph.references(name) {
        print_tree(graph, reference, depth + 1, max_depth, seen, show_duplicates);
    }
}
