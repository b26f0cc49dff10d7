//! pmap Core Library
//!
//! Port-allocation registry for a storage cluster management daemon.
//! Provides functionality to:
//! - Classify the dynamic port range as free or foreign at startup
//! - Lease ports to brick and proxy processes, first fit from the range base
//! - Bind one or more service names (brick multiplexing) and a session to a port
//! - Look ports up by number, by service name, or by session
//! - Release bindings, freeing a port when its last service leaves
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Port table, entries and the pure lookup/allocation algorithms
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: External system implementations
//! - `application`: The lock-guarded registry and the service facade

// Hexagonal architecture layers
pub mod domain;
pub mod ports;
pub mod adapters;
pub mod application;

pub mod config;
pub mod error;

#[cfg(test)]
mod testing;

// Re-export domain types (primary API)
pub use domain::{PortEntry, PortState, SessionToken, BASE_PORT, MAX_PORT};

// Re-export other commonly used types
pub use adapters::TcpProber;
pub use application::{PmapService, PortRecord, PortRegistry, RegistrySnapshot};
pub use config::{ConfigStore, PmapConfig};
pub use error::{Error, Result};
pub use ports::PortProber;
