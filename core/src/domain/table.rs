//! The port table and the pure algorithms that operate on it.
//!
//! Nothing here locks or talks to the OS. Probing is injected as a closure so
//! the allocator's first-fit scan can be tested against any availability map.

use serde::{Deserialize, Serialize};

use super::{checked_port, is_resource_path, PortEntry, PortState, SessionToken};
use super::{BASE_PORT, MAX_PORT};

/// Dense table of entries covering every port number, plus watermarks.
#[derive(Debug, Clone)]
pub struct PortTable {
    base_port: u16,
    high_watermark: u16,
    entries: Vec<PortEntry>,
}

impl PortTable {
    /// Create a table with every entry Free and both watermarks unset.
    ///
    /// The base port is set by the initializer through [`PortTable::set_base_port`].
    pub fn new() -> Self {
        Self {
            base_port: 0,
            high_watermark: 0,
            entries: vec![PortEntry::default(); MAX_PORT as usize + 1],
        }
    }

    /// Lowest port considered for allocation and searches.
    pub fn base_port(&self) -> u16 {
        self.base_port
    }

    /// Highest port ever leased or bound. Never lowered.
    pub fn high_watermark(&self) -> u16 {
        self.high_watermark
    }

    /// Entry for `port`.
    pub fn entry(&self, port: u16) -> &PortEntry {
        &self.entries[port as usize]
    }

    fn entry_mut(&mut self, port: u16) -> &mut PortEntry {
        &mut self.entries[port as usize]
    }

    fn raise_watermark(&mut self, port: u16) {
        if port > self.high_watermark {
            self.high_watermark = port;
        }
    }

    /// Set the floor of the managed range.
    pub fn set_base_port(&mut self, port: u16) {
        self.base_port = port;
    }

    /// Record the boot-time classification of a managed port.
    pub fn classify(&mut self, port: u16, state: PortState) {
        self.entry_mut(port).state = state;
    }

    /// Ports in the managed range, lowest first.
    pub fn managed_ports(&self) -> std::ops::RangeInclusive<u16> {
        self.base_port..=MAX_PORT
    }

    /// Ports from the watermark down to the base port, most recent first.
    fn recent_ports(&self) -> impl Iterator<Item = u16> {
        (self.base_port..=self.high_watermark).rev()
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Lease the lowest acceptable port that `is_free` confirms.
    ///
    /// Free ports are always candidates; Foreign ports only when
    /// `recheck_foreign` is set. A candidate that fails the probe keeps its
    /// recorded state.
    pub fn lease_first<F>(&mut self, recheck_foreign: bool, mut is_free: F) -> Option<u16>
    where
        F: FnMut(u16) -> bool,
    {
        let port = self.managed_ports().find(|&port| {
            let candidate = match self.entry(port).state {
                PortState::Free => true,
                PortState::Foreign => recheck_foreign,
                _ => false,
            };
            candidate && is_free(port)
        })?;

        self.entry_mut(port).state = PortState::Leased;
        self.raise_watermark(port);
        Some(port)
    }

    // =========================================================================
    // Binding
    // =========================================================================

    /// Record that `name` occupies `port` under `state`.
    ///
    /// The session is overwritten unconditionally. Returns `false` without
    /// touching the table when `port` is out of range.
    pub fn bind(
        &mut self,
        port: u32,
        name: &str,
        state: PortState,
        session: Option<SessionToken>,
    ) -> bool {
        let Some(port) = checked_port(port) else {
            return false;
        };

        let entry = self.entry_mut(port);
        entry.state = state;
        entry.owners.push(name.to_string());
        entry.session = session;

        self.raise_watermark(port);
        true
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Space-joined owners of a BrickServer port, or an empty string.
    pub fn owners_of(&self, port: u32) -> String {
        match checked_port(port).map(|p| self.entry(p)) {
            Some(entry) if entry.state == PortState::BrickServer => entry.joined_owners(),
            _ => String::new(),
        }
    }

    /// Most recent port in `state` that `name` is bound to.
    pub fn find_by_name(&self, name: &str, state: PortState) -> Option<u16> {
        self.recent_ports().find(|&port| {
            let entry = self.entry(port);
            entry.state == state && entry.is_owned_by(name)
        })
    }

    /// Most recent port in `state` associated with `session`.
    pub fn find_by_session(&self, session: &SessionToken, state: PortState) -> Option<u16> {
        self.recent_ports().find(|&port| {
            let entry = self.entry(port);
            entry.state == state && entry.session.as_ref() == Some(session)
        })
    }

    // =========================================================================
    // Release
    // =========================================================================

    /// Work out which port a release request refers to.
    ///
    /// An explicit nonzero port always wins, even when it is out of range (in
    /// which case nothing resolves). Otherwise a resource-path name is tried,
    /// then the session.
    pub fn resolve_release(
        &self,
        port: u32,
        name: &str,
        state: PortState,
        session: Option<&SessionToken>,
    ) -> Option<u16> {
        if port > 0 {
            return checked_port(port);
        }

        if is_resource_path(name) {
            if let Some(port) = self.find_by_name(name, state) {
                return Some(port);
            }
        }

        session.and_then(|session| self.find_by_session(session, state))
    }

    /// Remove `name` from `port`, freeing the entry if it was the last owner.
    ///
    /// With several owners only `name` is dropped, and the session is cleared
    /// only if it equals `session`. An entry with no owners keeps its state.
    pub fn release(&mut self, port: u16, name: &str, session: Option<&SessionToken>) {
        let entry = self.entry_mut(port);

        match entry.owners.len() {
            1 => entry.reset(),
            _ => {
                entry.remove_owner(name);
                if session.is_some() && entry.session.as_ref() == session {
                    entry.session = None;
                }
            }
        }
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Managed ports that are not Free, with their entries, lowest first.
    pub fn occupied(&self) -> impl Iterator<Item = (u16, &PortEntry)> {
        self.managed_ports()
            .map(move |port| (port, self.entry(port)))
            .filter(|(_, entry)| entry.state != PortState::Free || !entry.is_vacant())
    }

    /// Number of managed ports in each state.
    pub fn counts(&self) -> StateCounts {
        let mut counts = StateCounts::default();
        for port in self.managed_ports() {
            match self.entry(port).state {
                PortState::Free => counts.free += 1,
                PortState::Foreign => counts.foreign += 1,
                PortState::Leased => counts.leased += 1,
                PortState::Unclassified => counts.unclassified += 1,
                PortState::BrickServer => counts.brick_server += 1,
            }
        }
        counts
    }
}

impl Default for PortTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-state tally over the managed range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateCounts {
    pub free: usize,
    pub foreign: usize,
    pub leased: usize,
    pub unclassified: usize,
    pub brick_server: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    const B1: &str = "/bricks/b1";
    const B2: &str = "/bricks/b2";

    fn all_free(_: u16) -> bool {
        true
    }

    fn managed_table() -> PortTable {
        let mut table = PortTable::new();
        table.set_base_port(BASE_PORT);
        table
    }

    #[test]
    fn test_new_table() {
        let mut table = PortTable::new();
        assert_eq!(table.base_port(), 0);
        table.set_base_port(BASE_PORT);
        assert_eq!(table.base_port(), BASE_PORT);
        assert_eq!(table.managed_ports().count(), (MAX_PORT - BASE_PORT) as usize + 1);
        assert_eq!(table.high_watermark(), 0);
        assert_eq!(table.entry(MAX_PORT).state, PortState::Free);
    }

    #[test]
    fn test_lease_first_fit() {
        let mut table = managed_table();
        assert_eq!(table.lease_first(false, all_free), Some(BASE_PORT));
        assert_eq!(table.lease_first(false, all_free), Some(BASE_PORT + 1));
        assert_eq!(table.entry(BASE_PORT).state, PortState::Leased);
        assert_eq!(table.high_watermark(), BASE_PORT + 1);
    }

    #[test]
    fn test_lease_skips_failed_probe_without_downgrade() {
        let mut table = managed_table();
        let port = table.lease_first(false, |p| p != BASE_PORT);
        assert_eq!(port, Some(BASE_PORT + 1));
        assert_eq!(table.entry(BASE_PORT).state, PortState::Free);
    }

    #[test]
    fn test_lease_foreign_only_on_recheck() {
        let mut table = managed_table();
        for port in table.managed_ports() {
            table.classify(port, PortState::Foreign);
        }
        assert_eq!(table.lease_first(false, all_free), None);
        assert_eq!(table.high_watermark(), 0);
        assert_eq!(table.lease_first(true, all_free), Some(BASE_PORT));
    }

    #[test]
    fn test_lease_exhausted() {
        let mut table = managed_table();
        assert_eq!(table.lease_first(true, |_| false), None);
        assert_eq!(table.counts().free, (MAX_PORT - BASE_PORT) as usize + 1);
    }

    #[test]
    fn test_bind_out_of_range_is_ignored() {
        let mut table = managed_table();
        assert!(!table.bind(70_000, B1, PortState::BrickServer, None));
        assert_eq!(table.high_watermark(), 0);
        assert_eq!(table.occupied().count(), 0);
    }

    #[test]
    fn test_bind_overwrites_session() {
        let mut table = managed_table();
        let (a, b) = (SessionToken::new(), SessionToken::new());
        table.bind(BASE_PORT as u32, B1, PortState::BrickServer, Some(a));
        table.bind(BASE_PORT as u32, B2, PortState::BrickServer, Some(b));
        assert_eq!(table.entry(BASE_PORT).session, Some(b));
        table.bind(BASE_PORT as u32, "/bricks/b3", PortState::BrickServer, None);
        assert_eq!(table.entry(BASE_PORT).session, None);
        assert_eq!(table.entry(BASE_PORT).owners.len(), 3);
    }

    #[test]
    fn test_owners_of_requires_brick_server() {
        let mut table = managed_table();
        table.bind(BASE_PORT as u32, B1, PortState::BrickServer, None);
        table.bind(BASE_PORT as u32, B2, PortState::BrickServer, None);
        table.bind(BASE_PORT as u32 + 1, "gfproxyd", PortState::Leased, None);

        assert_eq!(table.owners_of(BASE_PORT as u32), "/bricks/b1 /bricks/b2");
        assert_eq!(table.owners_of(BASE_PORT as u32 + 1), "");
        assert_eq!(table.owners_of(100_000), "");
    }

    #[test]
    fn test_find_by_name_prefers_highest() {
        let mut table = managed_table();
        table.bind(BASE_PORT as u32, B1, PortState::BrickServer, None);
        table.bind(BASE_PORT as u32 + 7, B1, PortState::BrickServer, None);
        table.bind(BASE_PORT as u32 + 9, B2, PortState::BrickServer, None);

        assert_eq!(table.find_by_name(B1, PortState::BrickServer), Some(BASE_PORT + 7));
        assert_eq!(table.find_by_name(B1, PortState::Leased), None);
        assert_eq!(table.find_by_name("/bricks/none", PortState::BrickServer), None);
    }

    #[test]
    fn test_find_ignores_ports_below_base() {
        let mut table = managed_table();
        table.bind(2000, B1, PortState::BrickServer, None);
        assert_eq!(table.find_by_name(B1, PortState::BrickServer), None);
    }

    #[test]
    fn test_find_by_session() {
        let mut table = managed_table();
        let session = SessionToken::new();
        table.bind(BASE_PORT as u32 + 2, B1, PortState::BrickServer, Some(session));
        table.bind(BASE_PORT as u32 + 4, B2, PortState::BrickServer, None);

        assert_eq!(
            table.find_by_session(&session, PortState::BrickServer),
            Some(BASE_PORT + 2)
        );
        assert_eq!(table.find_by_session(&session, PortState::Leased), None);
        assert_eq!(
            table.find_by_session(&SessionToken::new(), PortState::BrickServer),
            None
        );
    }

    #[test]
    fn test_resolve_release_precedence() {
        let mut table = managed_table();
        let session = SessionToken::new();
        table.bind(BASE_PORT as u32 + 1, B1, PortState::BrickServer, None);
        table.bind(BASE_PORT as u32 + 3, B2, PortState::BrickServer, Some(session));

        // Explicit port wins over everything else.
        assert_eq!(
            table.resolve_release(BASE_PORT as u32 + 5, B1, PortState::BrickServer, Some(&session)),
            Some(BASE_PORT + 5)
        );
        // Out-of-range explicit port never falls back.
        assert_eq!(
            table.resolve_release(70_000, B1, PortState::BrickServer, Some(&session)),
            None
        );
        assert_eq!(
            table.resolve_release(0, B1, PortState::BrickServer, Some(&session)),
            Some(BASE_PORT + 1)
        );
        // Names that are not paths go straight to the session.
        assert_eq!(
            table.resolve_release(0, "bricks/b1", PortState::BrickServer, Some(&session)),
            Some(BASE_PORT + 3)
        );
        assert_eq!(
            table.resolve_release(0, "/bricks/gone", PortState::BrickServer, None),
            None
        );
    }

    #[test]
    fn test_release_single_owner_frees() {
        let mut table = managed_table();
        let session = SessionToken::new();
        table.bind(BASE_PORT as u32, B1, PortState::BrickServer, Some(session));
        table.release(BASE_PORT, B1, None);

        let entry = table.entry(BASE_PORT);
        assert_eq!(entry.state, PortState::Free);
        assert!(entry.is_vacant());
    }

    #[test]
    fn test_release_multiplexed() {
        let mut table = managed_table();
        let (a, b) = (SessionToken::new(), SessionToken::new());
        table.bind(BASE_PORT as u32, B1, PortState::BrickServer, Some(a));
        table.bind(BASE_PORT as u32, B2, PortState::BrickServer, Some(b));

        // Non-matching session stays attached.
        table.release(BASE_PORT, B1, Some(&a));
        let entry = table.entry(BASE_PORT);
        assert_eq!(entry.state, PortState::BrickServer);
        assert_eq!(entry.owners, vec![B2.to_string()]);
        assert_eq!(entry.session, Some(b));

        table.bind(BASE_PORT as u32, B1, PortState::BrickServer, Some(a));
        table.release(BASE_PORT, B2, Some(&a));
        let entry = table.entry(BASE_PORT);
        assert_eq!(entry.owners, vec![B1.to_string()]);
        assert_eq!(entry.session, None);
    }

    #[test]
    fn test_release_unbound_lease_stays_leased() {
        let mut table = managed_table();
        let port = table.lease_first(false, all_free).unwrap();
        table.release(port, "/bricks/x", None);
        assert_eq!(table.entry(port).state, PortState::Leased);
        assert!(table.entry(port).owners.is_empty());
        assert_eq!(table.high_watermark(), port);
    }

    #[test]
    fn test_release_without_owners_keeps_unmatched_session() {
        let mut table = managed_table();
        let (kept, other) = (SessionToken::new(), SessionToken::new());
        let port = table.lease_first(false, all_free).unwrap();
        table.entry_mut(port).session = Some(kept);

        table.release(port, "/bricks/x", Some(&other));
        assert_eq!(table.entry(port).state, PortState::Leased);
        assert_eq!(table.entry(port).session, Some(kept));

        table.release(port, "/bricks/x", Some(&kept));
        assert_eq!(table.entry(port).state, PortState::Leased);
        assert_eq!(table.entry(port).session, None);
    }

    #[test]
    fn test_release_leaves_foreign_alone() {
        let mut table = managed_table();
        table.classify(BASE_PORT, PortState::Foreign);
        table.release(BASE_PORT, "", None);
        assert_eq!(table.entry(BASE_PORT).state, PortState::Foreign);
    }

    #[test]
    fn test_counts_and_occupied() {
        let mut table = managed_table();
        table.classify(BASE_PORT + 10, PortState::Foreign);
        table.lease_first(false, all_free);
        table.bind(BASE_PORT as u32 + 1, B1, PortState::BrickServer, None);

        let counts = table.counts();
        assert_eq!(counts.foreign, 1);
        assert_eq!(counts.leased, 1);
        assert_eq!(counts.brick_server, 1);

        let occupied: Vec<u16> = table.occupied().map(|(port, _)| port).collect();
        assert_eq!(occupied, vec![BASE_PORT, BASE_PORT + 1, BASE_PORT + 10]);
    }
}
