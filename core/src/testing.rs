//! Test doubles shared by the unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::ports::PortProber;

/// In-memory prober: every port is free unless marked busy.
#[derive(Default)]
pub struct MockProber {
    busy: RwLock<HashSet<u16>>,
    probes: AtomicUsize,
}

impl MockProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_busy(ports: impl IntoIterator<Item = u16>) -> Self {
        Self {
            busy: RwLock::new(ports.into_iter().collect()),
            probes: AtomicUsize::new(0),
        }
    }

    pub fn set_busy(&self, port: u16, busy: bool) {
        let mut set = self.busy.write();
        if busy {
            set.insert(port);
        } else {
            set.remove(&port);
        }
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

impl PortProber for MockProber {
    fn is_free(&self, port: u16) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        !self.busy.read().contains(&port)
    }
}
