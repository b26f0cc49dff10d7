//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.

pub mod prober;

// Re-export main types for convenience
pub use prober::TcpProber;
