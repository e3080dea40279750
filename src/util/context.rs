//! Global context for sdkgraph operations.
//!
//! Provides centralized access to the working directory and the
//! configuration locations.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use crate::util::config::{load_config, Config};

/// Project directories for sdkgraph
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("com", "sdkgraph", "sdkgraph"));

/// Name of the per-working-directory settings directory.
pub const PROJECT_DIR_NAME: &str = ".sdkgraph";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory (the root all project names are relative to)
    cwd: PathBuf,

    /// Home directory for global sdkgraph settings
    home: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        let home = match PROJECT_DIRS.as_ref() {
            Some(dirs) => dirs.config_dir().to_path_buf(),
            None => directories::BaseDirs::new()
                .map(|b| b.home_dir().join(PROJECT_DIR_NAME))
                .unwrap_or_else(|| PathBuf::from(PROJECT_DIR_NAME)),
        };

        Ok(GlobalContext { cwd, home })
    }

    /// Create a GlobalContext with a specific working directory.
    ///
    /// Relative paths are resolved against the process working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = if cwd.is_absolute() {
            cwd
        } else {
            ctx.cwd.join(cwd)
        };
        ctx.cwd = crate::util::fs::normalize_path(&ctx.cwd);
        Ok(ctx)
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Get the working-directory settings directory.
    pub fn project_dir(&self) -> PathBuf {
        self.cwd.join(PROJECT_DIR_NAME)
    }

    /// Get the working-directory configuration file path.
    pub fn project_config_path(&self) -> PathBuf {
        self.project_dir().join("config.toml")
    }

    /// Load the merged global + project configuration.
    pub fn load_config(&self) -> Config {
        load_config(&self.config_path(), &self.project_config_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_context_paths() {
        let ctx = GlobalContext::new().unwrap();
        assert!(ctx.cwd().is_absolute());
        assert!(ctx.config_path().ends_with("config.toml"));
    }

    #[test]
    fn test_project_config_is_loaded() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join(PROJECT_DIR_NAME)).unwrap();
        std::fs::write(
            tmp.path().join(PROJECT_DIR_NAME).join("config.toml"),
            "[packages]\ncache_dir = \"/srv/nuget\"\n",
        )
        .unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf()).unwrap();
        let config = ctx.load_config();
        assert_eq!(config.packages_dir(), PathBuf::from("/srv/nuget"));
    }

    #[test]
    fn test_with_cwd_normalizes() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_cwd(tmp.path().join("a").join("..")).unwrap();
        assert_eq!(ctx.cwd(), crate::util::fs::normalize_path(tmp.path()));
    }
}
