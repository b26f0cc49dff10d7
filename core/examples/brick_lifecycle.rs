//! Example: Start, multiplex and stop bricks against the real port range.

use pmap_core::{PmapConfig, PmapService, PortState, SessionToken};

fn main() {
    println!("Classifying dynamic port range...\n");

    let service = PmapService::from_config(&PmapConfig::default());
    service.start();

    let session = SessionToken::new();
    let Some(port) = service.assign(0, "/bricks/b1") else {
        eprintln!("No port available");
        return;
    };
    service.bind(port as u32, "/bricks/b1", PortState::BrickServer, Some(session));
    service.bind(port as u32, "/bricks/b2", PortState::BrickServer, Some(session));
    println!("Port {} serves: {}", port, service.lookup_by_port(port as u32));

    service.release(0, "/bricks/b1", PortState::BrickServer, None);
    println!("After stopping b1: {}", service.lookup_by_port(port as u32));

    service.release(0, "", PortState::BrickServer, Some(&session));
    let state = service
        .entry(port as u32)
        .map(|entry| entry.state)
        .unwrap_or_default();
    println!("After stopping b2: port {} is {}", port, state);
}
