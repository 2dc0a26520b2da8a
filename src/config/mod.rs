//! Configuration module for the ledger
//!
//! The only configuration the ledger needs is where its key file and data
//! file live.

pub mod paths;

pub use paths::LedgerPaths;
