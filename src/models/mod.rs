//! Core data models for the ledger
//!
//! Accounts, their numbers, transaction records and receipts.

pub mod account;
pub mod ids;
pub mod receipt;
pub mod transaction;

pub use account::{validate_amount, Account, RECEIPT_HISTORY_LEN};
pub use ids::AccountNumber;
pub use receipt::Receipt;
pub use transaction::{TransactionKind, TransactionRecord};
