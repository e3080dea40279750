//! Project discovery.
//!
//! Starting from the workspace's project directory, read the descriptor
//! there and follow its project references depth-first. Referenced
//! projects are recorded before the projects that reference them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::descriptor::{ProjectDescriptorBuilder, ProjectName};
use crate::core::graph::GraphError;
use crate::core::project_file::ProjectFile;
use crate::core::props::PropsCache;
use crate::core::workspace::{find_descriptor, Workspace};
use crate::util::fs::normalize_path;

/// Result of discovery: every loaded project, children first.
#[derive(Debug)]
pub struct Discovered {
    pub root: ProjectName,
    pub projects: Vec<ProjectDescriptorBuilder>,
    /// Project files parsed, including rejected ones.
    pub descriptors_read: usize,
}

impl Discovered {
    pub fn root_project(&self) -> Option<&ProjectDescriptorBuilder> {
        self.projects.iter().find(|p| p.name() == &self.root)
    }
}

struct Discovery<'a> {
    ws: &'a Workspace,
    excluded: Vec<String>,
    props: PropsCache,
    completed: HashSet<ProjectName>,
    in_progress: Vec<ProjectName>,
    projects: Vec<ProjectDescriptorBuilder>,
    descriptors_read: usize,
}

/// Discover the project graph below the workspace's start directory.
pub fn discover(ws: &Workspace) -> Result<Discovered> {
    let mut discovery = Discovery {
        ws,
        excluded: ws.excluded_dirs(),
        props: PropsCache::new(),
        completed: HashSet::new(),
        in_progress: Vec::new(),
        projects: Vec::new(),
        descriptors_read: 0,
    };

    let root = discovery
        .visit(ws.start_dir(), 0)?
        .ok_or_else(|| GraphError::NoProject {
            dir: ws.start_dir().to_path_buf(),
        })?;

    tracing::info!(
        "discovered {} project(s) from {} ({} props file(s))",
        discovery.projects.len(),
        root,
        discovery.props.files_read()
    );

    Ok(Discovered {
        root,
        projects: discovery.projects,
        descriptors_read: discovery.descriptors_read,
    })
}

impl Discovery<'_> {
    /// Load the project in `dir` and everything it references.
    ///
    /// `Ok(None)` means there is no usable project in `dir`.
    fn visit(&mut self, dir: &Path, depth: usize) -> Result<Option<ProjectName>> {
        let descriptor = match find_descriptor(dir) {
            Ok(Some(descriptor)) => descriptor,
            Ok(None) => {
                tracing::debug!("no project file in {}", dir.display());
                return Ok(None);
            }
            Err(e) => {
                tracing::warn!("skipping {}: {:#}", dir.display(), e);
                return Ok(None);
            }
        };

        let name = ProjectName::from_relative(&self.ws.relativize(&descriptor));

        if self.completed.contains(&name) {
            tracing::debug!("{:indent$}{} (already loaded)", "", name, indent = depth * 2);
            return Ok(Some(name));
        }

        if let Some(pos) = self.in_progress.iter().position(|n| n == &name) {
            let mut chain = self.in_progress[pos..].to_vec();
            chain.push(name);
            return Err(GraphError::Cycle { chain }.into());
        }

        tracing::debug!("{:indent$}reading {}", "", name, indent = depth * 2);

        let inherited = self
            .props
            .for_dir(dir)
            .with_context(|| format!("failed to load inherited properties for {}", name))?
            .clone();

        self.descriptors_read += 1;
        let project = match ProjectFile::read(&descriptor, &inherited, &self.excluded) {
            Ok(project) => project,
            Err(e) => {
                tracing::warn!("skipping {}: {}", name, e);
                return Ok(None);
            }
        };

        let sources = project
            .sources
            .iter()
            .map(|s| self.ws.relativize(s))
            .collect();

        let mut builder = ProjectDescriptorBuilder::new(name.clone(), project.target_framework.clone())
            .sources(sources)
            .language_version(project.language_version)
            .nullable(project.nullable)
            .intermediate_dir(project.intermediate_dir.clone())
            .packages(project.packages.clone());

        self.in_progress.push(name.clone());

        for reference in &project.project_references {
            let target = normalize_path(&dir.join(reference));
            let Some(target_dir) = target.parent() else {
                continue;
            };

            match self.visit(target_dir, depth + 1)? {
                Some(child) => {
                    if child.file_name() != reference.file_name().unwrap_or_default().to_string_lossy() {
                        tracing::debug!("{}: reference {} resolved to {}", name, reference.display(), child);
                    }
                    builder.add_reference(child);
                }
                None => tracing::warn!(
                    "{}: referenced project {} could not be loaded; reference dropped",
                    name,
                    reference.display()
                ),
            }
        }

        self.in_progress.pop();

        if !self.completed.insert(name.clone()) {
            return Err(GraphError::Duplicate { name }.into());
        }
        self.projects.push(builder);

        Ok(Some(name))
    }
}
