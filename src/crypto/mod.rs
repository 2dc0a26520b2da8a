//! Cryptographic functions for the ledger
//!
//! Provides AES-256-GCM token encryption with a single persisted key for
//! field-level encryption of account data.

pub mod cipher_box;
pub mod key_file;
pub mod secret_key;

pub use cipher_box::CipherBox;
pub use key_file::load_or_create_key;
pub use secret_key::SecretKey;
