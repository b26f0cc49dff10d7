//! Session correlation token.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque handle for the network session that registered interest in a port.
///
/// The registry stores and compares tokens but never interprets them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(Uuid);

impl SessionToken {
    /// Mint a fresh token for a new session.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an identifier issued by the transport layer.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// The underlying identifier.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
