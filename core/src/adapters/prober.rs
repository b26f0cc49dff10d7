//! TCP bind prober.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener};

use tracing::trace;

use crate::ports::PortProber;

/// Probes ports by binding a listener and dropping it straight away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpProber {
    address: IpAddr,
}

impl TcpProber {
    /// Create a prober that binds on all IPv4 interfaces.
    pub fn new() -> Self {
        Self::with_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }

    /// Create a prober that binds on a specific address.
    pub fn with_address(address: IpAddr) -> Self {
        Self { address }
    }

    /// The address probes bind on.
    pub fn address(&self) -> IpAddr {
        self.address
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new()
    }
}

impl PortProber for TcpProber {
    fn is_free(&self, port: u16) -> bool {
        match TcpListener::bind(SocketAddr::new(self.address, port)) {
            Ok(_listener) => true,
            Err(e) => {
                trace!(port = port, error = %e, "Port probe failed");
                false
            }
        }
    }
}
