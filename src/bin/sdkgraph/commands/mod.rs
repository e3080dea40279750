//! Command implementations

pub mod completions;
pub mod packages;
pub mod resolve;
pub mod tree;

use std::path::Path;

use anyhow::Result;

use crate::cli::GlobalArgs;
use sdkgraph::core::Workspace;
use sdkgraph::util::GlobalContext;

/// Build the workspace for a command, applying command-line overrides on
/// top of the configuration files.
pub fn workspace(global: &GlobalArgs, project: Option<&Path>) -> Result<Workspace> {
    let ctx = match &global.directory {
        Some(dir) => GlobalContext::with_cwd(dir.clone())?,
        None => GlobalContext::new()?,
    };

    let mut ws = Workspace::new(&ctx, project)?;
    let config = ws.config_mut();

    if let Some(dir) = &global.packages {
        config.packages.cache_dir = Some(dir.clone());
    }
    if let Some(dir) = &global.dotnet_root {
        config.runtime.dotnet_root = Some(dir.clone());
    }
    if let Some(dir) = &global.mono_root {
        config.runtime.mono_root = Some(dir.clone());
    }
    if let Some(flavor) = &global.runtime {
        config.runtime.flavor = Some(flavor.clone());
    }

    tracing::debug!("workspace root: {}", ws.root().display());
    Ok(ws)
}
