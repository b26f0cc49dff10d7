//! Port state and per-port entry models.

use serde::{Deserialize, Serialize};

use super::SessionToken;

/// Start of the IANA dynamic/private port range, the floor for allocation.
pub const BASE_PORT: u16 = 49152;

/// Highest valid TCP port number.
pub const MAX_PORT: u16 = u16::MAX;

/// Convert an externally supplied port number into a table index.
///
/// Returns `None` for anything above [`MAX_PORT`].
pub fn checked_port(port: u32) -> Option<u16> {
    u16::try_from(port).ok()
}

/// Whether a service name looks like a resource (brick) path.
pub fn is_resource_path(name: &str) -> bool {
    name.starts_with('/')
}

// ============================================================================
// PortState
// ============================================================================

/// Classification of a single port in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum PortState {
    /// Available for allocation.
    #[default]
    Free,
    /// Occupied by something outside this daemon's control.
    Foreign,
    /// Handed out by the allocator, possibly not yet bound.
    Leased,
    /// Known but carrying no classification.
    #[serde(rename = "none")]
    Unclassified,
    /// Serving one or more bricks.
    BrickServer,
}

impl PortState {
    /// All port states.
    pub const ALL: [PortState; 5] = [
        PortState::Free,
        PortState::Foreign,
        PortState::Leased,
        PortState::Unclassified,
        PortState::BrickServer,
    ];

    /// Get the display name for this state.
    pub fn display_name(&self) -> &'static str {
        match self {
            PortState::Free => "free",
            PortState::Foreign => "foreign",
            PortState::Leased => "leased",
            PortState::Unclassified => "none",
            PortState::BrickServer => "brick-server",
        }
    }
}

impl std::fmt::Display for PortState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// PortEntry
// ============================================================================

/// Registry record for one port number.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PortEntry {
    /// Current classification.
    pub state: PortState,
    /// Names of the services bound to this port. Order carries no meaning.
    #[serde(default)]
    pub owners: Vec<String>,
    /// Session that last registered interest in this port.
    #[serde(default)]
    pub session: Option<SessionToken>,
}

impl PortEntry {
    /// Whether `name` is among the owners.
    pub fn is_owned_by(&self, name: &str) -> bool {
        self.owners.iter().any(|owner| owner == name)
    }

    /// Whether nothing is bound and no session is attached.
    pub fn is_vacant(&self) -> bool {
        self.owners.is_empty() && self.session.is_none()
    }

    /// Return the entry to the Free state.
    pub fn reset(&mut self) {
        self.owners.clear();
        self.session = None;
        self.state = PortState::Free;
    }

    /// Remove one owner by name, swapping the last owner into its slot.
    ///
    /// Returns `true` if the name was present.
    pub fn remove_owner(&mut self, name: &str) -> bool {
        match self.owners.iter().position(|owner| owner == name) {
            Some(pos) => {
                self.owners.swap_remove(pos);
                true
            }
            None => false,
        }
    }

    /// Owners joined with single spaces.
    pub fn joined_owners(&self) -> String {
        self.owners.join(" ")
    }
}
