//! Scan command - run the startup classification and summarize it.

use anyhow::Result;
use pmap_core::{ConfigStore, PmapService, PortState};

pub async fn run(store: &ConfigStore, list_foreign: bool, json: bool) -> Result<()> {
    let config = store.load().await?;
    let service = PmapService::from_config(&config);
    service.start();

    let snapshot = service.snapshot();

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!(
        "Range {}-{}: {} free, {} foreign",
        snapshot.base_port,
        pmap_core::MAX_PORT,
        snapshot.counts.free,
        snapshot.counts.foreign
    );

    if list_foreign {
        let foreign: Vec<String> = snapshot
            .in_state(PortState::Foreign)
            .map(|record| record.port.to_string())
            .collect();

        if foreign.is_empty() {
            println!("No foreign ports.");
        } else {
            println!("Foreign: {}", foreign.join(", "));
        }
    }
    Ok(())
}
