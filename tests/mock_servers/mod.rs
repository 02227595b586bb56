//! Mock servers for adapter integration testing
//!
//! These mock servers simulate real players so the adapters can be exercised
//! end to end without hardware on the network.

pub mod bluos;

pub use bluos::{MockBluOsPlayer, MockFailure};
