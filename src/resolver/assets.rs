//! `project.assets.json` loading.
//!
//! The restore step writes one assets file per project. Only the `targets`
//! table is read: it lists every package in the restored closure as
//! `"<name>/<version>"` together with that package's own dependencies.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors reading an assets file that exists.
#[derive(Debug, Error)]
pub enum AssetsError {
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed assets file {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("assets file {} has {count} targets, expected exactly one", .path.display())]
    TargetCount { path: PathBuf, count: usize },

    #[error("assets file {} has a library key `{key}` that is not `name/version`", .path.display())]
    InvalidKey { path: PathBuf, key: String },
}

impl AssetsError {
    pub fn path(&self) -> &Path {
        match self {
            AssetsError::Io { path, .. }
            | AssetsError::Json { path, .. }
            | AssetsError::TargetCount { path, .. }
            | AssetsError::InvalidKey { path, .. } => path,
        }
    }
}

/// One restored package and what it depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NugetDependency {
    pub name: String,
    pub version: String,
    /// Dependency name -> version requirement, as written in the assets file.
    pub dependencies: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RawAssets {
    #[serde(default)]
    targets: BTreeMap<String, BTreeMap<String, RawLibrary>>,
}

#[derive(Debug, Deserialize)]
struct RawLibrary {
    #[serde(default)]
    dependencies: Option<BTreeMap<String, serde_json::Value>>,
}

/// The lock manifest of a single project.
#[derive(Debug, Clone, Default)]
pub struct LockManifest {
    records: Vec<NugetDependency>,
}

impl LockManifest {
    /// Load the manifest at `path`.
    ///
    /// A missing file is not an error: the project simply has not been
    /// restored yet, so no records are produced.
    pub fn load(path: &Path) -> Result<Self, AssetsError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    "no assets file at {}; try restoring the project",
                    path.display()
                );
                return Ok(LockManifest::default());
            }
            Err(source) => {
                return Err(AssetsError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::parse(path, &text)
    }

    /// Parse assets-file JSON; `path` is only used for error messages.
    pub fn parse(path: &Path, text: &str) -> Result<Self, AssetsError> {
        let raw: RawAssets = serde_json::from_str(text).map_err(|source| AssetsError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        let count = raw.targets.len();
        let libraries = match raw.targets.into_values().next() {
            Some(libraries) if count == 1 => libraries,
            _ => {
                return Err(AssetsError::TargetCount {
                    path: path.to_path_buf(),
                    count,
                })
            }
        };

        let mut records = Vec::new();
        for (key, library) in libraries {
            let Some(dependencies) = library.dependencies else {
                continue;
            };

            let (name, version) = match key.split_once('/') {
                Some((name, version)) if !name.is_empty() && !version.is_empty() => {
                    (name.to_string(), version.to_string())
                }
                _ => {
                    return Err(AssetsError::InvalidKey {
                        path: path.to_path_buf(),
                        key,
                    })
                }
            };

            let dependencies = dependencies
                .into_iter()
                .map(|(dep, value)| {
                    let requirement = match value {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (dep, requirement)
                })
                .collect();

            records.push(NugetDependency {
                name,
                version,
                dependencies,
            });
        }

        tracing::debug!("{} package records in {}", records.len(), path.display());
        Ok(LockManifest { records })
    }

    pub fn records(&self) -> &[NugetDependency] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
