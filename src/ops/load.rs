//! Full workspace loading: discovery, runtime selection, package closure
//! and assembly resolution.

use anyhow::Result;

use crate::core::descriptor::{ProjectDescriptorBuilder, ProjectName};
use crate::core::graph::{GraphError, ProjectGraph};
use crate::core::runtime::RuntimeConfig;
use crate::core::workspace::Workspace;
use crate::ops::discover::{discover, Discovered};
use crate::resolver::{expand, AssemblyResolver, ClosureStats, ConflictPolicy, LockManifest, ResolveError};
use crate::sources::{PackageCache, RuntimeLibraries};

/// A project's package closure, without assembly resolution.
#[derive(Debug)]
pub struct PackageClosure {
    pub project: ProjectDescriptorBuilder,
    pub stats: ClosureStats,
}

/// Load the workspace into a fully resolved project graph.
pub fn load_workspace(ws: &Workspace) -> Result<ProjectGraph> {
    let config = ws.config();
    let discovered = discover(ws)?;
    let runtime = select_runtime(ws, &discovered)?;
    let policy = config.conflict_policy()?;

    let cache = PackageCache::new(config.packages_dir());
    let runtime_libs = RuntimeLibraries::locate(config, &runtime);
    let resolver = AssemblyResolver::new(&cache, &runtime_libs, &runtime)
        .floating_minimum(config.resolve.floating_minimum);

    tracing::debug!("package cache: {}", cache.root().display());

    let mut projects = Vec::with_capacity(discovered.projects.len());
    for mut project in discovered.projects {
        let stats = expand_packages(ws, &mut project, policy)?;
        let libraries = resolver.resolve(project.package_set())?;
        tracing::info!(
            "{}: {} package(s) ({} transitive, {} iteration(s)), {} assemblies",
            project.name(),
            project.package_set().len(),
            stats.added,
            stats.iterations,
            libraries.len()
        );
        projects.push(project.build(libraries));
    }

    Ok(ProjectGraph::new(projects, discovered.root, runtime)?)
}

/// Load only the project reference graph; no package or assembly
/// resolution, every project's library list is empty.
pub fn load_references(ws: &Workspace) -> Result<ProjectGraph> {
    let discovered = discover(ws)?;
    let runtime = select_runtime(ws, &discovered)?;
    let projects = discovered
        .projects
        .into_iter()
        .map(|p| p.build(Vec::new()))
        .collect();

    Ok(ProjectGraph::new(projects, discovered.root, runtime)?)
}

/// Discover the workspace and compute each project's package closure.
pub fn resolve_packages(ws: &Workspace) -> Result<(ProjectName, Vec<PackageClosure>)> {
    let policy = ws.config().conflict_policy()?;
    let discovered = discover(ws)?;

    let mut closures = Vec::with_capacity(discovered.projects.len());
    for mut project in discovered.projects {
        let stats = expand_packages(ws, &mut project, policy)?;
        closures.push(PackageClosure { project, stats });
    }

    Ok((discovered.root, closures))
}

fn select_runtime(ws: &Workspace, discovered: &Discovered) -> Result<RuntimeConfig> {
    let root = discovered
        .root_project()
        .ok_or_else(|| GraphError::NoProject {
            dir: ws.start_dir().to_path_buf(),
        })?;

    Ok(RuntimeConfig::select(
        root.target_framework(),
        discovered.projects.iter().map(|p| p.get_language_version()),
        ws.config().flavor()?,
    ))
}

fn expand_packages(
    ws: &Workspace,
    project: &mut ProjectDescriptorBuilder,
    policy: ConflictPolicy,
) -> Result<ClosureStats> {
    let manifest = LockManifest::load(&ws.abs(&project.assets_path())).map_err(ResolveError::from)?;
    Ok(expand(project.package_set_mut(), manifest.records(), policy))
}
