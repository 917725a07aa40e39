//! Output modules
//!
//! Modules:
//! - export: CSV projection and output file handling

pub mod export;
