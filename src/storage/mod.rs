//! Storage layer for the ledger
//!
//! The whole ledger lives in one JSON document: an object keyed by account
//! number whose values hold the encrypted holder, balance and history
//! tokens. Every save rewrites the entire document.

pub mod file_io;

pub use file_io::{read_json, write_json_atomic};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Persisted form of one account; every field is an encrypted token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAccount {
    pub account_holder: String,
    pub balance: String,
    #[serde(default)]
    pub transactions: Vec<String>,
}

/// The on-disk document, keyed by account number
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerDocument {
    pub accounts: BTreeMap<String, StoredAccount>,
}

/// The data file backing a ledger
#[derive(Debug, Clone)]
pub struct LedgerFile {
    path: PathBuf,
}

impl LedgerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document; `None` means the file does not exist yet
    pub fn load(&self) -> Result<Option<LedgerDocument>, LedgerError> {
        read_json(&self.path)
    }

    /// Overwrite the file with `document`
    pub fn save(&self, document: &LedgerDocument) -> Result<(), LedgerError> {
        write_json_atomic(&self.path, document)
    }
}
