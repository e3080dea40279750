//! Assemblies provided by the installed runtime.
//!
//! dotnet keeps one directory per installed shared runtime
//! (`<root>/shared/Microsoft.NETCore.App/<version>`); mono keeps one
//! reference-assembly directory per framework API level
//! (`<root>/4.6.1-api`) plus a facade directory with `netstandard.dll`.

use std::path::{Path, PathBuf};

use crate::core::framework::RuntimeFlavor;
use crate::core::runtime::RuntimeConfig;
use crate::resolver::version::parse_version_lenient;
use crate::util::config::Config;
use crate::util::fs::subdirectories;

/// Shared-runtime directory under the dotnet root.
pub const NETCORE_APP_DIR: &str = "shared/Microsoft.NETCore.App";

/// Directories searched for runtime-provided assemblies.
#[derive(Debug, Clone)]
pub struct RuntimeLibraries {
    dir: PathBuf,
    facades: Option<PathBuf>,
}

impl RuntimeLibraries {
    pub fn new(dir: impl Into<PathBuf>, facades: Option<PathBuf>) -> Self {
        RuntimeLibraries {
            dir: dir.into(),
            facades,
        }
    }

    /// Find the assembly directories for `runtime` on this machine.
    pub fn locate(config: &Config, runtime: &RuntimeConfig) -> Self {
        match runtime.flavor() {
            RuntimeFlavor::DotNet => {
                let base = config.dotnet_root().join(NETCORE_APP_DIR);
                let dir = match pick_shared_runtime(&base, runtime.target_framework().runtime_version()) {
                    Some(dir) => dir,
                    None => {
                        tracing::warn!(
                            "no shared runtime for {} under {}",
                            runtime.target_framework(),
                            base.display()
                        );
                        base
                    }
                };
                tracing::debug!("runtime assemblies: {}", dir.display());
                RuntimeLibraries::new(dir, None)
            }
            RuntimeFlavor::Mono => {
                let root = config.mono_root();
                let api = runtime
                    .target_framework()
                    .mono_api_dir()
                    .filter(|api| root.join(api).is_dir())
                    .unwrap_or_else(|| config.mono_api().to_string());
                let dir = root.join(&api);
                let facades = root.join(config.mono_facades());
                tracing::debug!(
                    "runtime assemblies: {} (facades {})",
                    dir.display(),
                    facades.display()
                );
                RuntimeLibraries::new(dir, Some(facades))
            }
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every path `file_name` is looked up at, in order.
    pub fn candidates(&self, file_name: &str) -> Vec<PathBuf> {
        let mut paths = vec![self.dir.join(file_name)];
        if let Some(facades) = &self.facades {
            paths.push(facades.join(file_name));
        }
        paths
    }

    /// Locate a runtime-provided assembly by file name.
    pub fn find(&self, file_name: &str) -> Option<PathBuf> {
        self.candidates(file_name).into_iter().find(|p| p.is_file())
    }
}

/// Highest installed shared runtime matching `major.minor`, or the highest
/// installed one at all when the target does not name a runtime.
fn pick_shared_runtime(base: &Path, wanted: Option<(u64, u64)>) -> Option<PathBuf> {
    subdirectories(base)
        .into_iter()
        .filter_map(|dir| {
            let name = dir.file_name()?.to_string_lossy().into_owned();
            let version = parse_version_lenient(&name)?;
            Some((version, dir))
        })
        .filter(|(v, _)| match wanted {
            Some((major, minor)) => v.major == major && v.minor == minor,
            None => true,
        })
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, dir)| dir)
}
