//! NiceHash provider stats API

mod client;
mod envelope;

pub use client::{NiceHashClient, StatsSource, DEFAULT_API_URL, DEFAULT_TIMEOUT};
pub use envelope::{
    decode_response, parse_history_entry, ProviderStats, BUCKET_SECS, METHOD_EX, METHOD_PAYMENTS,
};
