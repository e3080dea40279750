//! `sdkgraph resolve` command

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, ResolveArgs};
use sdkgraph::core::ProjectGraph;
use sdkgraph::ops::load_workspace;

pub fn execute(global: &GlobalArgs, args: ResolveArgs) -> Result<()> {
    let ws = super::workspace(global, args.project.as_deref())?;
    let graph = load_workspace(&ws)?;

    if args.json {
        let json = serde_json::to_string_pretty(&graph).context("failed to serialize project graph")?;
        println!("{}", json);
    } else {
        print_graph(&graph);
    }

    Ok(())
}

fn print_graph(graph: &ProjectGraph) {
    let runtime = graph.runtime();
    println!(
        "runtime: {} {} (C# {})",
        runtime.flavor(),
        runtime.target_framework(),
        runtime.language_version()
    );

    for project in graph.projects() {
        let marker = if project.name() == graph.root() { " (root)" } else { "" };
        println!();
        println!(
            "{} [{}, C# {}]{}",
            project.name(),
            project.target_framework(),
            project.language_version(),
            marker
        );
        println!("  sources: {}", project.sources().len());

        if !project.references().is_empty() {
            println!("  references:");
            for reference in project.references() {
                println!("    {}", reference);
            }
        }

        if !project.packages().is_empty() {
            println!("  packages:");
            for package in project.packages().iter() {
                println!("    {} {} ({})", package.name, package.version, package.origin);
            }
        }

        println!("  assemblies:");
        for library in project.libraries() {
            println!("    {}", library.display());
        }
    }
}
