//! Probe command - check individual ports.

use anyhow::Result;
use pmap_core::{ConfigStore, PortProber, TcpProber};
use serde::Serialize;

#[derive(Serialize)]
struct ProbeResult {
    port: u16,
    free: bool,
}

pub async fn run(store: &ConfigStore, ports: &[u16], json: bool) -> Result<()> {
    let config = store.load().await?;
    let prober = TcpProber::with_address(config.probe_address);

    let results: Vec<ProbeResult> = ports
        .iter()
        .map(|&port| ProbeResult {
            port,
            free: prober.is_free(port),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!("{:<6} STATUS", "PORT");
    for result in &results {
        let status = if result.free { "free" } else { "unavailable" };
        println!("{:<6} {}", result.port, status);
    }
    Ok(())
}
