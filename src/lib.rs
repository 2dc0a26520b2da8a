//! Secure Ledger - single-user bank ledger with encryption at rest
//!
//! This library keeps bank account records (holder name, balance and
//! transaction history) in a JSON file where every sensitive field is stored
//! as an AES-256-GCM token.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Key file and data file locations
//! - `error`: Custom error types
//! - `crypto`: Key file bootstrap and the token cipher box
//! - `models`: Accounts, account numbers, transaction records, receipts
//! - `storage`: JSON document layout and atomic file writes
//! - `services`: The ledger (load, save, create, lookup, transfers)
//! - `display`: Receipt formatting
//! - `cli`: Interactive menu driver
//!
//! # Example
//!
//! ```rust,ignore
//! use secure_ledger::{config::LedgerPaths, services::Ledger};
//!
//! let mut ledger = Ledger::open(LedgerPaths::default())?;
//! let number = ledger.create_account("Alice")?;
//! ledger.deposit(number.as_str(), 100.0)?;
//! ledger.save()?;
//! ```

pub mod cli;
pub mod config;
pub mod crypto;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
