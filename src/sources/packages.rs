//! The local NuGet package cache.
//!
//! Layout: `<root>/<lower-case id>/<version>/lib/<moniker>/*.dll`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::util::fs::{files_with_extension, subdirectories};

/// Read-only view of an extracted package cache.
#[derive(Debug, Clone)]
pub struct PackageCache {
    root: PathBuf,
}

impl PackageCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        PackageCache { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every installed version of `name`.
    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.root.join(name.to_ascii_lowercase())
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.package_dir(name).is_dir()
    }

    pub fn lib_dir(&self, name: &str, version: &str) -> PathBuf {
        self.package_dir(name).join(version).join("lib")
    }

    /// Variant directory names under `lib/`, sorted.
    pub fn variants(&self, name: &str, version: &str) -> Vec<String> {
        subdirectories(&self.lib_dir(name, version))
            .into_iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect()
    }

    /// Assemblies shipped for one variant, sorted by file name.
    pub fn assemblies(&self, name: &str, version: &str, variant: &str) -> Result<Vec<PathBuf>> {
        files_with_extension(&self.lib_dir(name, version).join(variant), "dll")
    }
}
