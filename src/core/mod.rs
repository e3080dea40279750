//! Core data structures for sdkgraph.
//!
//! This module contains the foundational types used throughout sdkgraph:
//! - Target frameworks, runtime flavors and language versions
//! - Project descriptors and their package sets
//! - Property inheritance and project-file parsing
//! - The workspace and the resolved project graph

pub mod descriptor;
pub mod framework;
pub mod graph;
pub mod language;
pub mod package;
pub mod project_file;
pub mod props;
pub mod runtime;
pub mod workspace;

pub use descriptor::{ProjectDescriptor, ProjectDescriptorBuilder, ProjectName};
pub use framework::{RuntimeFlavor, TargetFramework};
pub use graph::{GraphError, ProjectGraph};
pub use language::LanguageVersion;
pub use package::{Origin, PackageRequirement, PackageSet};
pub use project_file::{DescriptorError, ProjectFile};
pub use props::{PropertyMap, PropsCache};
pub use runtime::RuntimeConfig;
pub use workspace::{find_descriptor, Workspace, ASSETS_FILE_NAME, DESCRIPTOR_EXTENSION};
