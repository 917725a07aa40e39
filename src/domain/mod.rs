//! Domain models for the provider stats export
//!
//! Everything here is plain data: decoded once per run, never mutated,
//! dropped after the CSV is written.

mod algorithm;
mod records;

pub use algorithm::{name_of, Algorithm};
pub use records::{
    decimal_from_value, AlgorithmHistory, HashrateEntry, HistoryEntry, Payment, PaymentKind,
};
