//! Secure memory handling for the symmetric key
//!
//! The key is zeroed on drop and never printed.

use std::fmt;

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{LedgerError, LedgerResult};

/// Length of the AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// A 256-bit symmetric key that zeros its contents on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    bytes: [u8; KEY_SIZE],
}

impl SecretKey {
    /// Generate a fresh key from the OS random number generator
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Build a key from raw bytes, which must be exactly [`KEY_SIZE`] long
    pub fn from_slice(raw: &[u8]) -> LedgerResult<Self> {
        if raw.len() != KEY_SIZE {
            return Err(LedgerError::Encryption(format!(
                "Invalid key length: expected {}, got {}",
                KEY_SIZE,
                raw.len()
            )));
        }

        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(raw);
        Ok(Self { bytes })
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

// Don't print the key in Debug output
impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("len", &self.bytes.len())
            .finish()
    }
}
