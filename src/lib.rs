//! Export a mining pool provider's payouts and hashrate history to CSV.
//!
//! The pipeline is strictly sequential: build the query, issue one GET,
//! decode the envelope into typed records, filter by date, write CSV.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod modules;
