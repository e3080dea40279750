//! Configuration file support for sdkgraph.
//!
//! Two configuration file locations are consulted:
//! - Global: `<config dir>/config.toml` - User-wide defaults
//! - Project: `.sdkgraph/config.toml` - Working-directory overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::framework::RuntimeFlavor;
use crate::resolver::closure::ConflictPolicy;

/// Default install location of the dotnet SDK on Linux.
pub const DEFAULT_DOTNET_ROOT: &str = "/usr/share/dotnet";

/// Default install location of mono's reference assemblies.
pub const DEFAULT_MONO_ROOT: &str = "/usr/lib/mono";

/// Default mono reference-assembly set.
pub const DEFAULT_MONO_API: &str = "4.6.1-api";

/// Directory (under the mono root) holding `netstandard.dll`.
pub const DEFAULT_MONO_FACADES: &str = "4.5/Facades";

/// sdkgraph configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Local package cache settings
    pub packages: PackagesConfig,

    /// Runtime-provided assembly locations
    pub runtime: RuntimeSettings,

    /// Resolution policy
    pub resolve: ResolveConfig,

    /// Project and source discovery
    pub discovery: DiscoveryConfig,
}

/// Local NuGet package cache.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagesConfig {
    /// Root of the extracted package cache (e.g. ~/.nuget/packages)
    pub cache_dir: Option<PathBuf>,
}

/// Where the runtime-provided assemblies live.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Force a runtime flavor instead of deriving it from the root project
    pub flavor: Option<String>,

    /// dotnet installation root (contains `shared/Microsoft.NETCore.App`)
    pub dotnet_root: Option<PathBuf>,

    /// mono library root (contains `4.6.1-api`, `4.5/Facades`, ...)
    pub mono_root: Option<PathBuf>,

    /// mono reference-assembly directory used when the target does not name one
    pub mono_api: Option<String>,

    /// mono facade directory holding `netstandard.dll`
    pub mono_facades: Option<String>,
}

/// Resolution policy settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// `highest` or `first`
    pub conflict_policy: Option<String>,

    /// Resolve a bare minimum version to the lowest installed match
    #[serde(default)]
    pub floating_minimum: bool,
}

/// Project and source discovery settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Directory names skipped when scanning for source files
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.packages.cache_dir.is_some() {
            self.packages.cache_dir = other.packages.cache_dir;
        }

        if other.runtime.flavor.is_some() {
            self.runtime.flavor = other.runtime.flavor;
        }
        if other.runtime.dotnet_root.is_some() {
            self.runtime.dotnet_root = other.runtime.dotnet_root;
        }
        if other.runtime.mono_root.is_some() {
            self.runtime.mono_root = other.runtime.mono_root;
        }
        if other.runtime.mono_api.is_some() {
            self.runtime.mono_api = other.runtime.mono_api;
        }
        if other.runtime.mono_facades.is_some() {
            self.runtime.mono_facades = other.runtime.mono_facades;
        }

        if other.resolve.conflict_policy.is_some() {
            self.resolve.conflict_policy = other.resolve.conflict_policy;
        }
        if other.resolve.floating_minimum {
            self.resolve.floating_minimum = true;
        }

        // Exclusions accumulate
        for name in other.discovery.exclude {
            if !self.discovery.exclude.contains(&name) {
                self.discovery.exclude.push(name);
            }
        }
    }

    /// Local package cache root.
    ///
    /// Order: config, `NUGET_PACKAGES`, `~/.nuget/packages`.
    pub fn packages_dir(&self) -> PathBuf {
        if let Some(dir) = &self.packages.cache_dir {
            return dir.clone();
        }
        if let Some(dir) = std::env::var_os("NUGET_PACKAGES") {
            return PathBuf::from(dir);
        }
        directories::BaseDirs::new()
            .map(|b| b.home_dir().join(".nuget").join("packages"))
            .unwrap_or_else(|| PathBuf::from(".nuget/packages"))
    }

    /// dotnet installation root.
    ///
    /// Order: config, `DOTNET_ROOT`, the directory of `dotnet` on `PATH`,
    /// [`DEFAULT_DOTNET_ROOT`].
    pub fn dotnet_root(&self) -> PathBuf {
        if let Some(dir) = &self.runtime.dotnet_root {
            return dir.clone();
        }
        if let Some(dir) = std::env::var_os("DOTNET_ROOT") {
            return PathBuf::from(dir);
        }
        if let Ok(exe) = which::which("dotnet") {
            let exe = exe.canonicalize().unwrap_or(exe);
            if let Some(parent) = exe.parent() {
                return parent.to_path_buf();
            }
        }
        PathBuf::from(DEFAULT_DOTNET_ROOT)
    }

    pub fn mono_root(&self) -> PathBuf {
        self.runtime
            .mono_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MONO_ROOT))
    }

    pub fn mono_api(&self) -> &str {
        self.runtime.mono_api.as_deref().unwrap_or(DEFAULT_MONO_API)
    }

    pub fn mono_facades(&self) -> &str {
        self.runtime
            .mono_facades
            .as_deref()
            .unwrap_or(DEFAULT_MONO_FACADES)
    }

    /// Parse the forced runtime flavor, if any.
    pub fn flavor(&self) -> Result<Option<RuntimeFlavor>> {
        self.runtime
            .flavor
            .as_deref()
            .map(|s| s.parse::<RuntimeFlavor>().map_err(anyhow::Error::msg))
            .transpose()
    }

    /// Parse the conflict policy, defaulting to highest-wins.
    pub fn conflict_policy(&self) -> Result<ConflictPolicy> {
        match self.resolve.conflict_policy.as_deref() {
            Some(s) => s.parse::<ConflictPolicy>().map_err(anyhow::Error::msg),
            None => Ok(ConflictPolicy::default()),
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.sdkgraph/config.toml)
/// 2. Global config (<config dir>/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        let global = Config::load_or_default(global_path);
        config.merge(global);
    }

    if project_path.exists() {
        let project = Config::load_or_default(project_path);
        config.merge(project);
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.packages.cache_dir.is_none());
        assert!(!config.resolve.floating_minimum);
        assert_eq!(config.mono_api(), "4.6.1-api");
        assert_eq!(config.mono_facades(), "4.5/Facades");
        assert_eq!(config.conflict_policy().unwrap(), ConflictPolicy::HighestWins);
        assert_eq!(config.flavor().unwrap(), None);
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[packages]
cache_dir = "/opt/nuget"

[runtime]
flavor = "mono"
mono_api = "4.8-api"

[resolve]
conflict_policy = "first"
floating_minimum = true

[discovery]
exclude = ["SampleFiles"]
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.packages_dir(), PathBuf::from("/opt/nuget"));
        assert_eq!(config.flavor().unwrap(), Some(RuntimeFlavor::Mono));
        assert_eq!(config.mono_api(), "4.8-api");
        assert_eq!(config.conflict_policy().unwrap(), ConflictPolicy::KeepFirst);
        assert!(config.resolve.floating_minimum);
        assert_eq!(config.discovery.exclude, vec!["SampleFiles"]);
    }

    #[test]
    fn test_config_invalid_policy() {
        let mut config = Config::default();
        config.resolve.conflict_policy = Some("newest-ish".to_string());
        assert!(config.conflict_policy().is_err());
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.runtime.dotnet_root = Some(PathBuf::from("/usr/share/dotnet"));
        base.runtime.mono_api = Some("4.5-api".to_string());
        base.discovery.exclude = vec!["tools".to_string()];

        let mut override_cfg = Config::default();
        override_cfg.runtime.dotnet_root = Some(PathBuf::from("/opt/dotnet"));
        override_cfg.discovery.exclude = vec!["tools".to_string(), "samples".to_string()];

        base.merge(override_cfg);

        assert_eq!(base.dotnet_root(), PathBuf::from("/opt/dotnet"));
        assert_eq!(base.mono_api(), "4.5-api"); // Not overridden
        assert_eq!(base.discovery.exclude, vec!["tools", "samples"]);
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(
            &global_path,
            r#"
[packages]
cache_dir = "/global/nuget"

[runtime]
mono_root = "/global/mono"
"#,
        )
        .unwrap();

        std::fs::write(
            &project_path,
            r#"
[packages]
cache_dir = "/project/nuget"
"#,
        )
        .unwrap();

        let config = load_config(&global_path, &project_path);

        assert_eq!(config.packages_dir(), PathBuf::from("/project/nuget"));
        assert_eq!(config.mono_root(), PathBuf::from("/global/mono"));
    }

    #[test]
    fn test_load_or_default_on_bad_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();

        let config = Config::load_or_default(&path);
        assert!(config.packages.cache_dir.is_none());
    }
}
