//! Application layer - The registry and the service built on it.
//!
//! `PortRegistry` owns the lock-guarded port table and drives the prober.
//! `PmapService` is the boundary the rest of the daemon talks to: it adds the
//! assign-with-cleanup operation and the configured allocation policy.

mod pmap_service;
mod registry;

pub use pmap_service::PmapService;
pub use registry::{PortRecord, PortRegistry, RegistrySnapshot};
