//! Domain layer - Pure registry data models and algorithms.
//!
//! This module contains the port table and its entries. These types have no
//! I/O dependencies and no locking, and can be tested in isolation.

mod port;
mod session;
mod table;

// Re-export all domain types
pub use port::{checked_port, is_resource_path, PortEntry, PortState, BASE_PORT, MAX_PORT};
pub use session::SessionToken;
pub use table::{PortTable, StateCounts};
