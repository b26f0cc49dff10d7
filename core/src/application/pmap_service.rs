//! Port map application service.

use tracing::{debug, info};

use crate::adapters::TcpProber;
use crate::config::PmapConfig;
use crate::domain::{PortEntry, PortState, SessionToken};
use crate::ports::PortProber;

use super::{PortRegistry, RegistrySnapshot};

/// Process-wide port map.
///
/// Created once at daemon start and shared behind an `Arc` with every
/// component that starts, stops or looks up brick and proxy processes.
/// Volfile generation only ever calls [`PmapService::assign`].
pub struct PmapService<P: PortProber = TcpProber> {
    registry: PortRegistry<P>,
    recheck_foreign: bool,
}

impl PmapService<TcpProber> {
    /// Create a service probing real sockets as described by `config`.
    pub fn from_config(config: &PmapConfig) -> Self {
        Self::new(TcpProber::with_address(config.probe_address), config)
    }
}

impl<P: PortProber> PmapService<P> {
    /// Create a service around a specific prober.
    pub fn new(prober: P, config: &PmapConfig) -> Self {
        Self {
            registry: PortRegistry::new(prober),
            recheck_foreign: config.recheck_foreign,
        }
    }

    /// Classify the managed port range. Call once during daemon startup.
    pub fn start(&self) {
        self.registry.initialize();
        info!(
            recheck_foreign = self.recheck_foreign,
            "Port map service started"
        );
    }

    /// The underlying registry.
    pub fn registry(&self) -> &PortRegistry<P> {
        &self.registry
    }

    /// Obtain a port for `resource_id`.
    ///
    /// A nonzero `previous_port` means the resource held a port before; any
    /// binding still recorded under its name is dropped first so the old slot
    /// can be reused. Returns `None` when no port is available.
    pub fn assign(&self, previous_port: u32, resource_id: &str) -> Option<u16> {
        if previous_port != 0 {
            debug!(
                previous_port = previous_port,
                resource = resource_id,
                "Clearing stale binding"
            );
            self.registry
                .release(0, resource_id, PortState::BrickServer, None);
        }
        self.registry.alloc(self.recheck_foreign)
    }

    /// Register `name` as occupying `port`.
    pub fn bind(&self, port: u32, name: &str, state: PortState, session: Option<SessionToken>) {
        self.registry.bind(port, name, state, session);
    }

    /// Deregister a service by port, resource path or session, in that order.
    pub fn release(
        &self,
        port: u32,
        name: &str,
        state: PortState,
        session: Option<&SessionToken>,
    ) {
        self.registry.release(port, name, state, session);
    }

    /// Answer "which bricks listen on this port".
    pub fn lookup_by_port(&self, port: u32) -> String {
        self.registry.lookup_by_port(port)
    }

    /// Most recent port bound to `name` in `state`.
    pub fn search(&self, name: &str, state: PortState) -> Option<u16> {
        self.registry.search(name, state)
    }

    /// Most recent port associated with `session` in `state`.
    pub fn search_by_session(&self, session: &SessionToken, state: PortState) -> Option<u16> {
        self.registry.search_by_session(session, state)
    }

    /// Copy of a single port's entry.
    pub fn entry(&self, port: u32) -> Option<PortEntry> {
        self.registry.entry(port)
    }

    /// Registry-wide view for diagnostics.
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.registry.snapshot()
    }
}
