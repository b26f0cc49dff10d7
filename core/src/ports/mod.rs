//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that the registry uses to interact
//! with the operating system. Implementations live in `adapters`.

mod prober;

pub use prober::PortProber;
