//! Key file bootstrap
//!
//! The key is stored as raw bytes, written once on first run and read on
//! every startup afterwards. There is no rotation.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use tracing::{debug, info};
use zeroize::Zeroize;

use crate::error::{LedgerError, LedgerResult};

use super::SecretKey;

/// Load the key stored at `path`, or generate and persist a new one
///
/// An existing file with the wrong length is reported as an error rather
/// than replaced, since a new key would make every stored token unreadable.
pub fn load_or_create_key(path: &Path) -> LedgerResult<SecretKey> {
    match fs::read(path) {
        Ok(mut raw) => {
            let key = SecretKey::from_slice(&raw);
            raw.zeroize();
            debug!(path = %path.display(), "loaded existing key file");
            key.map_err(|e| {
                LedgerError::Encryption(format!("Key file {} is unusable: {}", path.display(), e))
            })
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            let key = SecretKey::generate();
            write_key_file(path, &key)?;
            info!(path = %path.display(), "generated new key file");
            Ok(key)
        }
        Err(err) => Err(LedgerError::Io(format!(
            "Failed to read key file {}: {}",
            path.display(),
            err
        ))),
    }
}

fn write_key_file(path: &Path, key: &SecretKey) -> LedgerResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            LedgerError::Io(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(|e| {
        LedgerError::Io(format!(
            "Failed to create key file {}: {}",
            path.display(),
            e
        ))
    })?;

    file.write_all(key.as_bytes())
        .map_err(|e| LedgerError::Io(format!("Failed to write key file: {}", e)))?;

    file.sync_all()
        .map_err(|e| LedgerError::Io(format!("Failed to sync key file: {}", e)))?;

    Ok(())
}
