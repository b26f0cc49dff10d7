//! Shared, lock-guarded port registry.

use parking_lot::{Once, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::{
    checked_port, PortEntry, PortState, PortTable, SessionToken, StateCounts, BASE_PORT,
};
use crate::ports::PortProber;

/// The per-node port registry.
///
/// One read/write lock covers the whole table: lookups share the read side,
/// allocation, binding and release take it exclusively. The first operation
/// (or an explicit [`PortRegistry::initialize`]) classifies the managed range
/// exactly once; concurrent callers block until that pass has finished.
pub struct PortRegistry<P: PortProber> {
    prober: P,
    table: RwLock<PortTable>,
    init: Once,
}

impl<P: PortProber> PortRegistry<P> {
    /// Create an uninitialized registry that probes through `prober`.
    pub fn new(prober: P) -> Self {
        Self {
            prober,
            table: RwLock::new(PortTable::new()),
            init: Once::new(),
        }
    }

    /// The prober this registry consults.
    pub fn prober(&self) -> &P {
        &self.prober
    }

    /// Classify every managed port as Free or Foreign. Runs once.
    pub fn initialize(&self) {
        self.init.call_once(|| self.classify_range());
    }

    /// Whether the boot-time classification has completed.
    pub fn is_initialized(&self) -> bool {
        self.init.state().done()
    }

    fn classify_range(&self) {
        let mut table = self.table.write();
        table.set_base_port(BASE_PORT);
        let mut foreign = 0usize;

        for port in table.managed_ports() {
            let state = if self.prober.is_free(port) {
                PortState::Free
            } else {
                foreign += 1;
                PortState::Foreign
            };
            table.classify(port, state);
        }

        info!(
            base_port = table.base_port(),
            foreign = foreign,
            "Port registry initialized"
        );
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Lease the lowest available port, re-probing each candidate.
    ///
    /// Returns `None` when the whole managed range is exhausted.
    pub fn alloc(&self, recheck_foreign: bool) -> Option<u16> {
        self.initialize();
        let mut table = self.table.write();

        let port = table.lease_first(recheck_foreign, |port| self.prober.is_free(port));
        match port {
            Some(port) => debug!(port = port, "Leased port"),
            None => warn!(recheck_foreign = recheck_foreign, "No port available"),
        }
        port
    }

    /// Record that `name` occupies `port`. Out-of-range ports are ignored.
    pub fn bind(&self, port: u32, name: &str, state: PortState, session: Option<SessionToken>) {
        self.initialize();
        if self.table.write().bind(port, name, state, session) {
            debug!(port = port, name = name, state = %state, "Bound port");
        }
    }

    /// Deregister `name` from a port identified by number, name or session.
    ///
    /// Unresolvable requests are silently ignored.
    pub fn release(
        &self,
        port: u32,
        name: &str,
        state: PortState,
        session: Option<&SessionToken>,
    ) {
        self.initialize();
        let mut table = self.table.write();

        let Some(resolved) = table.resolve_release(port, name, state, session) else {
            debug!(port = port, name = name, "Release matched no port");
            return;
        };

        table.release(resolved, name, session);
        debug!(
            port = resolved,
            name = name,
            state = %table.entry(resolved).state,
            "Released port"
        );
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Space-joined names served on a BrickServer port, or an empty string.
    pub fn lookup_by_port(&self, port: u32) -> String {
        self.initialize();
        self.table.read().owners_of(port)
    }

    /// Most recently allocated port in `state` bound to `name`.
    pub fn search(&self, name: &str, state: PortState) -> Option<u16> {
        self.initialize();
        self.table.read().find_by_name(name, state)
    }

    /// Most recently allocated port in `state` associated with `session`.
    pub fn search_by_session(&self, session: &SessionToken, state: PortState) -> Option<u16> {
        self.initialize();
        self.table.read().find_by_session(session, state)
    }

    /// Copy of the entry for `port`, or `None` when out of range.
    pub fn entry(&self, port: u32) -> Option<PortEntry> {
        self.initialize();
        let port = checked_port(port)?;
        Some(self.table.read().entry(port).clone())
    }

    /// Highest port ever leased or bound.
    pub fn high_watermark(&self) -> u16 {
        self.initialize();
        self.table.read().high_watermark()
    }

    /// Lowest port considered for allocation.
    pub fn base_port(&self) -> u16 {
        self.initialize();
        self.table.read().base_port()
    }

    /// Point-in-time view of every non-free managed port.
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.initialize();
        let table = self.table.read();

        RegistrySnapshot {
            base_port: table.base_port(),
            high_watermark: table.high_watermark(),
            counts: table.counts(),
            ports: table
                .occupied()
                .map(|(port, entry)| PortRecord {
                    port,
                    state: entry.state,
                    owners: entry.owners.clone(),
                    session: entry.session,
                })
                .collect(),
        }
    }
}

/// Serializable registry view for operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySnapshot {
    pub base_port: u16,
    pub high_watermark: u16,
    pub counts: StateCounts,
    pub ports: Vec<PortRecord>,
}

impl RegistrySnapshot {
    /// Records in a given state.
    pub fn in_state(&self, state: PortState) -> impl Iterator<Item = &PortRecord> {
        self.ports.iter().filter(move |record| record.state == state)
    }
}

/// One port of a [`RegistrySnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRecord {
    pub port: u16,
    pub state: PortState,
    pub owners: Vec<String>,
    pub session: Option<SessionToken>,
}
