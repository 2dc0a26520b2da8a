//! Receipt model
//!
//! Decrypted snapshot of an account for display.

use super::ids::AccountNumber;
use super::transaction::TransactionRecord;

/// Holder, balance and recent history of one account
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub account_number: AccountNumber,
    pub holder_name: String,
    pub balance: f64,
    /// Most recent history entries, oldest first
    pub recent: Vec<TransactionRecord>,
    /// Entries among the most recent that could not be decrypted
    pub skipped: usize,
}
