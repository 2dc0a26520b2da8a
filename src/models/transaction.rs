//! Transaction record model
//!
//! A transaction record is the plaintext shape of one history entry. It is
//! serialized to JSON and then encrypted; on disk only the token is visible.

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::AccountNumber;
use crate::error::{LedgerError, LedgerResult};

/// Format of the `date_time` field
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What kind of movement a record describes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionKind {
    Deposit,
    Withdraw,
    /// Outgoing leg of a transfer
    TransferTo(AccountNumber),
    /// Incoming leg of a transfer
    TransferFrom(AccountNumber),
    /// Any action text not produced by this crate
    Other(String),
}

impl TransactionKind {
    /// Recognise the action text stored in a record
    pub fn from_action(action: &str) -> Self {
        if action == "Deposit" {
            Self::Deposit
        } else if action == "Withdraw" {
            Self::Withdraw
        } else if let Some(number) = action.strip_prefix("Transfer to ") {
            Self::TransferTo(AccountNumber::from_stored(number.to_string()))
        } else if let Some(number) = action.strip_prefix("Transfer from ") {
            Self::TransferFrom(AccountNumber::from_stored(number.to_string()))
        } else {
            Self::Other(action.to_string())
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposit => write!(f, "Deposit"),
            Self::Withdraw => write!(f, "Withdraw"),
            Self::TransferTo(number) => write!(f, "Transfer to {}", number),
            Self::TransferFrom(number) => write!(f, "Transfer from {}", number),
            Self::Other(action) => write!(f, "{}", action),
        }
    }
}

/// Plaintext of one transaction history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Action text, e.g. "Deposit" or "Transfer to 12345678"
    pub action: String,

    /// Amount moved by this action (always positive)
    pub amount: f64,

    /// Local time the record was created
    #[serde(rename = "date_time", with = "date_time_format")]
    pub timestamp: NaiveDateTime,
}

impl TransactionRecord {
    /// Create a record stamped with the current local time
    pub fn new(kind: &TransactionKind, amount: f64) -> Self {
        Self {
            action: kind.to_string(),
            amount,
            timestamp: now_to_the_second(),
        }
    }

    /// Interpret the action text
    pub fn kind(&self) -> TransactionKind {
        TransactionKind::from_action(&self.action)
    }

    /// Canonical text form that gets encrypted
    pub fn to_plaintext(&self) -> LedgerResult<String> {
        serde_json::to_string(self)
            .map_err(|e| LedgerError::Json(format!("Failed to serialize transaction: {}", e)))
    }

    /// Parse the decrypted text form
    pub fn from_plaintext(text: &str) -> LedgerResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| LedgerError::Json(format!("Failed to parse transaction: {}", e)))
    }
}

impl fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {:.2}",
            self.timestamp.format(DATE_TIME_FORMAT),
            self.action,
            self.amount
        )
    }
}

fn now_to_the_second() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

mod date_time_format {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use super::DATE_TIME_FORMAT;

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(DATE_TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, DATE_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}
