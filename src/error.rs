//! Custom error types for the ledger
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for amounts, names and account numbers
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Withdraw or transfer larger than the available balance
    #[error("Insufficient funds in account {account}: need {needed}, have {available}")]
    InsufficientFunds {
        account: String,
        needed: f64,
        available: f64,
    },

    /// Encryption errors (cipher setup, key file problems)
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// A token failed authentication or could not be decoded
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// A holder name or balance could not be recovered
    #[error("Critical decryption failure for {field} of account {account}")]
    CriticalDecryption {
        account: String,
        field: &'static str,
    },

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// The data file exists but is not a valid ledger document
    #[error("Corrupt data file: {0}")]
    CorruptStore(String),
}

impl LedgerError {
    /// Create a "not found" error for accounts
    pub fn account_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Account",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is an insufficient funds error
    pub fn is_insufficient_funds(&self) -> bool {
        matches!(self, Self::InsufficientFunds { .. })
    }

    /// Business-rule violations the operator can recover from by retrying
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::InsufficientFunds { .. } | Self::Validation(_)
        )
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
