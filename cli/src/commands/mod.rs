//! Subcommand implementations.

pub mod assign;
pub mod config;
pub mod probe;
pub mod scan;

use std::path::PathBuf;

use anyhow::Result;
use pmap_core::ConfigStore;

/// Config store for an explicit path, or the default location.
pub fn config_store(path: Option<PathBuf>) -> Result<ConfigStore> {
    Ok(match path {
        Some(path) => ConfigStore::with_path(path),
        None => ConfigStore::new()?,
    })
}
