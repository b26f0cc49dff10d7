//! Assign command - walk the brick start-up path for a set of bricks.

use anyhow::{bail, Result};
use pmap_core::{ConfigStore, PmapService, PortProber, PortState, SessionToken};
use serde::Serialize;

#[derive(Serialize)]
struct Assignment {
    resource: String,
    port: u16,
    session: SessionToken,
}

#[derive(Serialize)]
struct Report {
    assignments: Vec<Assignment>,
    lookups: Vec<(u16, String)>,
}

pub async fn run(store: &ConfigStore, resources: &[String], mux: bool, json: bool) -> Result<()> {
    let config = store.load().await?;
    let service = PmapService::from_config(&config);
    service.start();

    let assignments = assign_all(&service, resources, mux)?;

    let mut ports: Vec<u16> = assignments.iter().map(|a| a.port).collect();
    ports.dedup();
    let lookups: Vec<(u16, String)> = ports
        .into_iter()
        .map(|port| (port, service.lookup_by_port(port as u32)))
        .collect();

    if json {
        let report = Report {
            assignments,
            lookups,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{:<6} {:<38} RESOURCE", "PORT", "SESSION");
    println!("{}", "-".repeat(80));
    for a in &assignments {
        println!("{:<6} {:<38} {}", a.port, a.session.to_string(), a.resource);
    }

    println!();
    for (port, names) in &lookups {
        println!("Port {} serves: {}", port, names);
    }
    Ok(())
}

fn assign_all<P: PortProber>(
    service: &PmapService<P>,
    resources: &[String],
    mux: bool,
) -> Result<Vec<Assignment>> {
    let mut assignments = Vec::with_capacity(resources.len());
    let mut shared_port = None;

    for resource in resources {
        let port = match shared_port {
            Some(port) if mux => port,
            _ => match service.assign(0, resource) {
                Some(port) => port,
                None => bail!("No port available for {}", resource),
            },
        };
        if shared_port.is_none() {
            shared_port = Some(port);
        }

        let session = SessionToken::new();
        service.bind(port as u32, resource, PortState::BrickServer, Some(session));
        assignments.push(Assignment {
            resource: resource.clone(),
            port,
            session,
        });
    }

    Ok(assignments)
}
