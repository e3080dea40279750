//! Workspace - central configuration hub.
//!
//! A Workspace is the working-directory root every project name is relative
//! to, the directory discovery starts from and the merged configuration.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::util::config::Config;
use crate::util::fs::{files_with_extension, normalize_path, relative_path};
use crate::util::GlobalContext;

/// Extension of project descriptors.
pub const DESCRIPTOR_EXTENSION: &str = "csproj";

/// The only `Sdk` attribute value accepted on `<Project>`.
pub const SUPPORTED_SDK: &str = "Microsoft.NET.Sdk";

/// Lock manifest written by the restore step.
pub const ASSETS_FILE_NAME: &str = "project.assets.json";

/// Intermediate output directory, relative to the project directory.
pub const DEFAULT_INTERMEDIATE_DIR: &str = "obj";

/// Build output directory; never scanned for sources.
pub const OUTPUT_DIR: &str = "bin";

/// A workspace rooted at the working directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Absolute root all project names are relative to
    root: PathBuf,

    /// Absolute directory of the root project
    start: PathBuf,

    /// Merged configuration
    config: Config,
}

impl Workspace {
    /// Create a workspace from the global context.
    ///
    /// `project_dir` (relative to the working directory, or absolute)
    /// selects the root project; it defaults to the working directory.
    pub fn new(ctx: &GlobalContext, project_dir: Option<&Path>) -> Result<Self> {
        let config = ctx.load_config();
        Self::with_config(ctx.cwd(), project_dir, config)
    }

    /// Create a workspace with an explicit configuration.
    pub fn with_config(root: &Path, project_dir: Option<&Path>, config: Config) -> Result<Self> {
        let root = normalize_path(root);
        let start = match project_dir {
            Some(dir) => normalize_path(&root.join(dir)),
            None => root.clone(),
        };

        if !start.is_dir() {
            bail!("project directory does not exist: {}", start.display());
        }

        Ok(Workspace {
            root,
            start,
            config,
        })
    }

    /// Get the workspace root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the directory of the root project.
    pub fn start_dir(&self) -> &Path {
        &self.start
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Absolute path of a root-relative path.
    pub fn abs(&self, rel: &Path) -> PathBuf {
        normalize_path(&self.root.join(rel))
    }

    /// Root-relative form of an absolute path.
    pub fn relativize(&self, abs: &Path) -> PathBuf {
        relative_path(&self.root, abs)
    }

    /// Directory names skipped by the source scan.
    pub fn excluded_dirs(&self) -> Vec<String> {
        let mut dirs = vec![OUTPUT_DIR.to_string(), DEFAULT_INTERMEDIATE_DIR.to_string()];
        for name in &self.config.discovery.exclude {
            if !dirs.contains(name) {
                dirs.push(name.clone());
            }
        }
        dirs
    }
}

/// The descriptor of the project in `dir`, if any.
///
/// Descriptors are considered in lexical order; with more than one the
/// first is used.
pub fn find_descriptor(dir: &Path) -> Result<Option<PathBuf>> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let mut found = files_with_extension(dir, DESCRIPTOR_EXTENSION)?;
    if found.len() > 1 {
        tracing::warn!(
            "{} project files in {}; using {}",
            found.len(),
            dir.display(),
            found[0].display()
        );
    }

    Ok(if found.is_empty() {
        None
    } else {
        Some(found.swap_remove(0))
    })
}
