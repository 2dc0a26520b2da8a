//! AES-256-GCM token encryption
//!
//! Every field the ledger persists is turned into a self-contained text
//! token. Before text encoding a token is laid out as:
//!
//! ```text
//! version (1) || issued_at (8, big-endian unix seconds) || nonce (12) || ciphertext + tag
//! ```
//!
//! The version byte and timestamp are passed as associated data, so they are
//! covered by the GCM tag along with the ciphertext. The whole byte string is
//! then encoded with URL-safe base64 so it can sit in a JSON string as-is.
//!
//! Ciphertext is not stable: encrypting the same plaintext twice yields two
//! different tokens. Nothing in the ledger compares tokens for equality.

use std::fmt;

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng, Payload},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE, Engine};
use chrono::Utc;
use tracing::warn;

use crate::error::{LedgerError, LedgerResult};

use super::SecretKey;

/// Current token format version
const TOKEN_VERSION: u8 = 1;

/// Size of the version byte plus timestamp
const HEADER_SIZE: usize = 1 + 8;

/// Size of the AES-GCM nonce in bytes (96 bits)
const NONCE_SIZE: usize = 12;

/// Size of the GCM authentication tag
const TAG_SIZE: usize = 16;

/// Holds the ledger key and turns plaintext into tokens and back
pub struct CipherBox {
    cipher: Aes256Gcm,
}

impl CipherBox {
    /// Create a cipher box around a key
    pub fn new(key: &SecretKey) -> LedgerResult<Self> {
        let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| LedgerError::Encryption(format!("Failed to create cipher: {}", e)))?;
        Ok(Self { cipher })
    }

    /// Encrypt a string into a text-safe token
    ///
    /// Generates a random nonce for each call.
    pub fn encrypt(&self, plaintext: &str) -> LedgerResult<String> {
        let issued_at = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
        let header = token_header(issued_at);

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(
                nonce,
                Payload {
                    msg: plaintext.as_bytes(),
                    aad: &header,
                },
            )
            .map_err(|e| LedgerError::Encryption(format!("Encryption failed: {}", e)))?;

        let mut raw = Vec::with_capacity(HEADER_SIZE + NONCE_SIZE + ciphertext.len());
        raw.extend_from_slice(&header);
        raw.extend_from_slice(&nonce_bytes);
        raw.extend_from_slice(&ciphertext);

        Ok(URL_SAFE.encode(raw))
    }

    /// Decrypt a token back into its plaintext
    ///
    /// Tampered data, a different key and malformed tokens all end up as
    /// [`LedgerError::Decryption`]; the failure is also logged as a warning.
    pub fn decrypt(&self, token: &str) -> LedgerResult<String> {
        self.try_open(token).inspect_err(|err| {
            warn!(error = %err, "could not decrypt token, treating value as missing");
        })
    }

    /// Decrypt a token, yielding `None` on failure
    ///
    /// For best-effort call sites such as receipt history.
    pub fn decrypt_opt(&self, token: &str) -> Option<String> {
        self.decrypt(token).ok()
    }

    fn try_open(&self, token: &str) -> LedgerResult<String> {
        let raw = URL_SAFE
            .decode(token)
            .map_err(|e| LedgerError::Decryption(format!("Invalid token encoding: {}", e)))?;

        if raw.len() < HEADER_SIZE + NONCE_SIZE + TAG_SIZE {
            return Err(LedgerError::Decryption(format!(
                "Token too short: {} bytes",
                raw.len()
            )));
        }

        let (header, rest) = raw.split_at(HEADER_SIZE);
        if header[0] != TOKEN_VERSION {
            return Err(LedgerError::Decryption(format!(
                "Unsupported token version: {}",
                header[0]
            )));
        }

        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(
                nonce,
                Payload {
                    msg: ciphertext,
                    aad: header,
                },
            )
            .map_err(|_| LedgerError::Decryption("invalid key or corrupted data".to_string()))?;

        String::from_utf8(plaintext).map_err(|e| {
            LedgerError::Decryption(format!("Invalid UTF-8 in decrypted data: {}", e))
        })
    }
}

// Never expose cipher state
impl fmt::Debug for CipherBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherBox").finish_non_exhaustive()
    }
}

fn token_header(issued_at: u64) -> [u8; HEADER_SIZE] {
    let mut header = [0u8; HEADER_SIZE];
    header[0] = TOKEN_VERSION;
    header[1..].copy_from_slice(&issued_at.to_be_bytes());
    header
}
