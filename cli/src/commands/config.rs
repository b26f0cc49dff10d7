//! Config command - show the effective configuration.

use anyhow::Result;
use pmap_core::{ConfigStore, BASE_PORT, MAX_PORT};

pub async fn show(store: &ConfigStore, json: bool) -> Result<()> {
    let config = store.load().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("Config file:      {}", store.path().display());
    println!("Port range:       {}-{}", BASE_PORT, MAX_PORT);
    println!("Recheck foreign:  {}", config.recheck_foreign);
    println!("Probe address:    {}", config.probe_address);
    Ok(())
}
