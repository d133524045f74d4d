//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod process;

use std::path::Path;

use tracing::debug;

use invex_core::models::config::InvexConfig;

/// Load the configuration from `config_path`, else from the default location
/// if a file exists there, else the defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<InvexConfig> {
    if let Some(path) = config_path {
        debug!("Loading config from {}", path);
        return Ok(InvexConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Loading config from {}", default_path.display());
        Ok(InvexConfig::from_file(&default_path)?)
    } else {
        Ok(InvexConfig::default())
    }
}
