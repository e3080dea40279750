//! `sdkgraph packages` command
//!
//! Prints each project's package closure without resolving assemblies, so
//! it works without a runtime installation.

use anyhow::{bail, Result};

use crate::cli::{GlobalArgs, PackagesArgs};
use sdkgraph::core::Origin;
use sdkgraph::ops::resolve_packages;

pub fn execute(global: &GlobalArgs, args: PackagesArgs) -> Result<()> {
    let ws = super::workspace(global, None)?;
    let (root, closures) = resolve_packages(&ws)?;

    let selected: Vec<_> = match &args.project {
        Some(query) => {
            let query = query.trim_end_matches('/').replace('\\', "/");
            let found: Vec<_> = closures
                .iter()
                .filter(|c| {
                    let name = c.project.name();
                    name.as_str() == query
                        || name.dir().to_string_lossy().replace('\\', "/") == query
                        || name.short_name().eq_ignore_ascii_case(&query)
                })
                .collect();
            if found.is_empty() {
                bail!("project `{}` not found in the graph rooted at {}", query, root);
            }
            found
        }
        None => closures.iter().collect(),
    };

    for closure in selected {
        let packages = closure.project.package_set();
        println!(
            "{} ({} package(s), {} transitive, {} iteration(s))",
            closure.project.name(),
            packages.len(),
            closure.stats.added,
            closure.stats.iterations
        );

        for package in packages.iter() {
            if args.transitive && package.origin != Origin::Transitive {
                continue;
            }
            match package.origin {
                Origin::Direct => println!("  {} {}", package.name, package.version),
                Origin::Transitive => println!("  {} {} (transitive)", package.name, package.version),
            }
        }
    }

    Ok(())
}
