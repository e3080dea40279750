//! ProjectGraph - the resolved project set.
//!
//! Holds every discovered project (children before parents), the root
//! project's name and the shared runtime configuration. Reference edges are
//! kept in a petgraph graph for lookups and ordering.

use std::collections::HashMap;
use std::path::PathBuf;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Topo;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::core::descriptor::{ProjectDescriptor, ProjectName};
use crate::core::runtime::RuntimeConfig;
use crate::util::diagnostic::{suggestions, Diagnostic, Subject};

/// Fatal errors while building the project graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("no project found in {}", .dir.display())]
    NoProject { dir: PathBuf },

    #[error("project reference cycle: {}", format_chain(.chain))]
    Cycle { chain: Vec<ProjectName> },

    #[error("project `{name}` registered twice")]
    Duplicate { name: ProjectName },
}

fn format_chain(chain: &[ProjectName]) -> String {
    chain
        .iter()
        .map(ProjectName::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl GraphError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            GraphError::NoProject { dir } => Diagnostic::error(self.to_string())
                .about(Subject::Path(dir.clone()))
                .note("the directory needs one SDK-style .csproj with at least one .cs file")
                .suggest(suggestions::NO_PROJECT),
            GraphError::Cycle { chain } => {
                let mut diag = Diagnostic::error(self.to_string());
                if let Some(first) = chain.first() {
                    diag = diag.about(Subject::Project(first.clone()));
                }
                diag.suggest("Remove one of the ProjectReference items in the cycle")
            }
            GraphError::Duplicate { name } => {
                Diagnostic::error(self.to_string()).about(Subject::Project(name.clone()))
            }
        }
    }
}

/// The resolved project set.
#[derive(Debug, Clone)]
pub struct ProjectGraph {
    /// Reference graph; an edge `a -> b` means `a` references `b`
    graph: DiGraph<ProjectName, ()>,

    /// Map from project name to node index
    nodes: HashMap<ProjectName, NodeIndex>,

    /// Projects in discovery order
    projects: Vec<ProjectDescriptor>,

    /// Map from project name to position in `projects`
    index: HashMap<ProjectName, usize>,

    root: ProjectName,

    runtime: RuntimeConfig,
}

impl ProjectGraph {
    /// Assemble a graph. Every name must be unique.
    pub fn new(
        projects: Vec<ProjectDescriptor>,
        root: ProjectName,
        runtime: RuntimeConfig,
    ) -> Result<Self, GraphError> {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();
        let mut index = HashMap::new();

        for (i, project) in projects.iter().enumerate() {
            if index.insert(project.name().clone(), i).is_some() {
                return Err(GraphError::Duplicate {
                    name: project.name().clone(),
                });
            }
            nodes.insert(project.name().clone(), graph.add_node(project.name().clone()));
        }

        for project in &projects {
            let from = nodes[project.name()];
            for reference in project.references() {
                if let Some(&to) = nodes.get(reference) {
                    if !graph.contains_edge(from, to) {
                        graph.add_edge(from, to, ());
                    }
                }
            }
        }

        if !index.contains_key(&root) {
            return Err(GraphError::NoProject {
                dir: root.dir(),
            });
        }

        Ok(ProjectGraph {
            graph,
            nodes,
            projects,
            index,
            root,
            runtime,
        })
    }

    pub fn root(&self) -> &ProjectName {
        &self.root
    }

    pub fn root_project(&self) -> &ProjectDescriptor {
        &self.projects[self.index[&self.root]]
    }

    pub fn runtime(&self) -> &RuntimeConfig {
        &self.runtime
    }

    /// Projects in discovery order (referenced projects first).
    pub fn projects(&self) -> &[ProjectDescriptor] {
        &self.projects
    }

    pub fn get(&self, name: &ProjectName) -> Option<&ProjectDescriptor> {
        self.index.get(name).map(|&i| &self.projects[i])
    }

    /// Look up by `/`-separated name, with or without the descriptor file
    /// name (`lib/Core/Core.csproj`, `lib/Core`) or by short name (`Core`).
    pub fn find(&self, query: &str) -> Option<&ProjectDescriptor> {
        let query = query.trim().trim_end_matches('/').replace('\\', "/");
        self.get(&ProjectName::from(query.as_str())).or_else(|| {
            self.projects.iter().find(|p| {
                p.name().dir().to_string_lossy().replace('\\', "/") == query
                    || p.name().short_name().eq_ignore_ascii_case(&query)
            })
        })
    }

    pub fn contains(&self, name: &ProjectName) -> bool {
        self.index.contains_key(name)
    }

    /// Projects `name` references directly.
    pub fn references(&self, name: &ProjectName) -> Vec<&ProjectName> {
        self.get(name)
            .map(|p| p.references().iter().filter(|r| self.contains(r)).collect())
            .unwrap_or_default()
    }

    /// Projects that reference `name` directly.
    pub fn dependents(&self, name: &ProjectName) -> Vec<&ProjectName> {
        match self.nodes.get(name) {
            Some(&node) => {
                let mut found: Vec<&ProjectName> = self
                    .graph
                    .neighbors_directed(node, petgraph::Direction::Incoming)
                    .map(|n| &self.graph[n])
                    .collect();
                found.sort();
                found
            }
            None => Vec::new(),
        }
    }

    /// Referenced projects before the projects that reference them.
    pub fn build_order(&self) -> Vec<&ProjectName> {
        let mut topo = Topo::new(&self.graph);
        let mut order = Vec::new();

        while let Some(node) = topo.next(&self.graph) {
            order.push(&self.graph[node]);
        }

        // Topo yields referencing projects first.
        order.reverse();
        order
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

impl Serialize for ProjectGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ProjectGraph", 3)?;
        state.serialize_field("root", &self.root)?;
        state.serialize_field("runtime", &self.runtime)?;
        state.serialize_field("projects", &self.projects)?;
        state.end()
    }
}
