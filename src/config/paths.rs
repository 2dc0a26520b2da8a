//! Path management for the ledger
//!
//! Resolves the two files the ledger owns: the raw symmetric key and the
//! encrypted JSON data file.
//!
//! ## Path Resolution Order
//!
//! 1. `--key-file` / `--data-file` flags, passed to [`LedgerPaths::new`]
//! 2. `SECURE_LEDGER_KEY_FILE` / `SECURE_LEDGER_DATA_FILE` environment variables
//!    (read by the binary's argument parser)
//! 3. `secret.key` and `bank_data.json` in the working directory

use std::path::{Path, PathBuf};

use crate::error::LedgerError;

/// Environment variable overriding the key file location
pub const KEY_FILE_ENV: &str = "SECURE_LEDGER_KEY_FILE";

/// Environment variable overriding the data file location
pub const DATA_FILE_ENV: &str = "SECURE_LEDGER_DATA_FILE";

/// Default key file name
pub const DEFAULT_KEY_FILE: &str = "secret.key";

/// Default data file name
pub const DEFAULT_DATA_FILE: &str = "bank_data.json";

/// Locations of the key file and the data file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerPaths {
    key_file: PathBuf,
    data_file: PathBuf,
}

impl LedgerPaths {
    /// Create paths from explicit locations
    pub fn new(key_file: impl Into<PathBuf>, data_file: impl Into<PathBuf>) -> Self {
        Self {
            key_file: key_file.into(),
            data_file: data_file.into(),
        }
    }

    /// Place both default file names under a base directory (useful for testing)
    pub fn with_base_dir(base_dir: impl AsRef<Path>) -> Self {
        let base_dir = base_dir.as_ref();
        Self {
            key_file: base_dir.join(DEFAULT_KEY_FILE),
            data_file: base_dir.join(DEFAULT_DATA_FILE),
        }
    }

    /// Get the path to the key file
    pub fn key_file(&self) -> &Path {
        &self.key_file
    }

    /// Get the path to the data file
    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Ensure the parent directories of both files exist
    pub fn ensure_parent_dirs(&self) -> Result<(), LedgerError> {
        for path in [&self.key_file, &self.data_file] {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    LedgerError::Io(format!(
                        "Failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        Ok(())
    }
}

impl Default for LedgerPaths {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_FILE, DEFAULT_DATA_FILE)
    }
}
