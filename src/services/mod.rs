//! Business logic layer
//!
//! The ledger orchestrates account creation, lookup, cross-account
//! transfers and persistence.

pub mod ledger;

pub use ledger::{Ledger, LoadStatus};
