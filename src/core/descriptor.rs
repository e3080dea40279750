//! Project descriptors.
//!
//! A project is identified by its [`ProjectName`]: the path of its `.csproj`
//! relative to the working-directory root. Discovery produces a
//! [`ProjectDescriptorBuilder`]; once assemblies are resolved it is turned
//! into an immutable [`ProjectDescriptor`].

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::framework::TargetFramework;
use crate::core::language::LanguageVersion;
use crate::core::package::PackageSet;
use crate::util::fs::to_slash;

/// Canonical project name, e.g. `lib/Core/Core.csproj`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ProjectName(String);

impl ProjectName {
    /// Build from a descriptor path relative to the root.
    pub fn from_relative(path: &Path) -> Self {
        ProjectName(to_slash(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Project directory relative to the root (empty for the root itself).
    pub fn dir(&self) -> PathBuf {
        Path::new(&self.0)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Descriptor file name, e.g. `Core.csproj`.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Descriptor file name without extension, e.g. `Core`.
    pub fn short_name(&self) -> &str {
        let file = self.file_name();
        file.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(file)
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectName {
    fn from(s: &str) -> Self {
        ProjectName(s.replace('\\', "/"))
    }
}

/// Everything known about a project before its assemblies are resolved.
#[derive(Debug, Clone)]
pub struct ProjectDescriptorBuilder {
    name: ProjectName,
    target_framework: TargetFramework,
    sources: Vec<PathBuf>,
    references: Vec<ProjectName>,
    language_version: LanguageVersion,
    nullable: bool,
    intermediate_dir: PathBuf,
    packages: PackageSet,
}

impl ProjectDescriptorBuilder {
    pub fn new(name: ProjectName, target_framework: TargetFramework) -> Self {
        ProjectDescriptorBuilder {
            name,
            target_framework,
            sources: Vec::new(),
            references: Vec::new(),
            language_version: LanguageVersion::BASELINE,
            nullable: false,
            intermediate_dir: PathBuf::from("obj"),
            packages: PackageSet::new(),
        }
    }

    pub fn sources(mut self, sources: Vec<PathBuf>) -> Self {
        self.sources = sources;
        self
    }

    pub fn language_version(mut self, language_version: LanguageVersion) -> Self {
        self.language_version = language_version;
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn intermediate_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.intermediate_dir = dir.into();
        self
    }

    pub fn packages(mut self, packages: PackageSet) -> Self {
        self.packages = packages;
        self
    }

    /// Record a validated project reference; repeats are ignored.
    pub fn add_reference(&mut self, name: ProjectName) {
        if !self.references.contains(&name) {
            self.references.push(name);
        }
    }

    pub fn name(&self) -> &ProjectName {
        &self.name
    }

    pub fn target_framework(&self) -> &TargetFramework {
        &self.target_framework
    }

    pub fn get_language_version(&self) -> LanguageVersion {
        self.language_version
    }

    pub fn references(&self) -> &[ProjectName] {
        &self.references
    }

    pub fn source_files(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn package_set(&self) -> &PackageSet {
        &self.packages
    }

    pub fn package_set_mut(&mut self) -> &mut PackageSet {
        &mut self.packages
    }

    /// Lock manifest location relative to the root.
    pub fn assets_path(&self) -> PathBuf {
        self.name
            .dir()
            .join(&self.intermediate_dir)
            .join(crate::core::workspace::ASSETS_FILE_NAME)
    }

    /// Finish the descriptor with its resolved assembly paths.
    pub fn build(self, libraries: Vec<PathBuf>) -> ProjectDescriptor {
        ProjectDescriptor {
            name: self.name,
            target_framework: self.target_framework,
            sources: self.sources,
            references: self.references,
            language_version: self.language_version,
            nullable: self.nullable,
            packages: self.packages,
            libraries,
        }
    }
}

/// A fully resolved project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDescriptor {
    name: ProjectName,
    target_framework: TargetFramework,
    sources: Vec<PathBuf>,
    references: Vec<ProjectName>,
    language_version: LanguageVersion,
    nullable: bool,
    packages: PackageSet,
    libraries: Vec<PathBuf>,
}

impl ProjectDescriptor {
    pub fn name(&self) -> &ProjectName {
        &self.name
    }

    pub fn target_framework(&self) -> &TargetFramework {
        &self.target_framework
    }

    /// Source files, relative to the root.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Referenced projects in declaration order.
    pub fn references(&self) -> &[ProjectName] {
        &self.references
    }

    pub fn language_version(&self) -> LanguageVersion {
        self.language_version
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    /// Direct and transitive package requirements.
    pub fn packages(&self) -> &PackageSet {
        &self.packages
    }

    /// Absolute assembly paths to compile against.
    pub fn libraries(&self) -> &[PathBuf] {
        &self.libraries
    }
}
