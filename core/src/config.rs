//! Configuration for the port map service.
//!
//! Stores configuration in JSON format at `~/.pmap/config.json`.
//! The registry's base port is deliberately absent: it is fixed at the start
//! of the dynamic/private range.

use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};

/// Configuration data stored in JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PmapConfig {
    /// Let `assign` reconsider ports that were occupied at startup.
    #[serde(default = "default_true", rename = "recheckForeign")]
    pub recheck_foreign: bool,

    /// Address the prober binds on when testing a port.
    #[serde(default = "default_probe_address", rename = "probeAddress")]
    pub probe_address: IpAddr,
}

fn default_true() -> bool {
    true
}

fn default_probe_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

impl Default for PmapConfig {
    fn default() -> Self {
        Self {
            recheck_foreign: true,
            probe_address: default_probe_address(),
        }
    }
}

/// Configuration store for the port map service.
///
/// Handles reading and writing configuration to `~/.pmap/config.json`.
pub struct ConfigStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    ///
    /// Default path: `~/.pmap/config.json`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        Ok(Self {
            config_path: home.join(".pmap").join("config.json"),
        })
    }

    /// Create a config store with a custom path.
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Path of the configuration file.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub async fn load(&self) -> Result<PmapConfig> {
        if !self.config_path.exists() {
            return Ok(PmapConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub async fn save(&self, config: &PmapConfig) -> Result<()> {
        if let Some(config_dir) = self.config_path.parent() {
            fs::create_dir_all(config_dir).await.map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(config)?;

        // Write atomically by writing to temp file then renaming
        let temp_path = self.config_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;

        fs::rename(&temp_path, &self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to rename config file: {}", e)))?;

        Ok(())
    }

    /// Set the foreign re-check policy.
    pub async fn set_recheck_foreign(&self, enabled: bool) -> Result<()> {
        let mut config = self.load().await?;
        config.recheck_foreign = enabled;
        self.save(&config).await
    }

    /// Set the probe address.
    pub async fn set_probe_address(&self, address: IpAddr) -> Result<()> {
        let mut config = self.load().await?;
        config.probe_address = address;
        self.save(&config).await
    }
}
