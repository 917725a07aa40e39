//! Infrastructure layer - External service integrations
//!
//! This layer contains the HTTP client for the mining pool's provider
//! statistics API and the decoding of its response envelope.

pub mod nicehash;

// Re-export types used by the driver and main.rs
pub use nicehash::{NiceHashClient, StatsSource};
