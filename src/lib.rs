//! sdkgraph - project graph discovery for SDK-style C# projects
//!
//! This crate finds a root `.csproj`, follows its project references,
//! applies `Directory.Build.props` inheritance, expands each project's
//! NuGet closure from `project.assets.json` and resolves the assemblies
//! every project compiles against.

pub mod core;
pub mod ops;
pub mod resolver;
pub mod sources;
pub mod util;

/// Test utilities for sdkgraph unit tests.
///
/// Only compiled for tests. Provides on-disk workspace fixtures with a
/// private package cache and runtime installations.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{ProjectDescriptor, ProjectGraph, ProjectName, RuntimeConfig, Workspace};

pub use crate::resolver::ResolveError;
pub use crate::util::GlobalContext;
