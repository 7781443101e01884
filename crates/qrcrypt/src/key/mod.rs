//! Key generation, persistence, and loading.
//!
//! # Lifecycle
//!
//! 1. [`generate_key`] draws 32 bytes from the OS CSPRNG.
//! 2. [`store_key`] writes the raw bytes to a caller-chosen file, replacing
//!    any previous content. Last writer wins; a crash mid-write can leave a
//!    partial file.
//! 3. [`load_key`] reads the whole file back. The key lives only for the
//!    duration of one operation and is zeroed when dropped.
//!
//! A key is revoked only by deleting its file.
//!
//! # Security invariants
//!
//! - Key bytes are never logged; only [`Key::fingerprint`] is.
//! - The loader does not check the length. A truncated or oversized file is
//!   reported by the cipher as an invalid key length.

pub mod material;

pub use material::{Key, KeyError};

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::crypto::KEY_LEN;
use crate::rng::{OsRandom, RandomSource};

/// Generate a new 256-bit key from the OS CSPRNG.
///
/// # Errors
///
/// Returns [`KeyError::Entropy`] if the platform entropy source is unavailable.
pub fn generate_key() -> Result<Key, KeyError> {
    generate_key_with(&OsRandom)
}

/// Generate a new 256-bit key from `rng`.
///
/// # Errors
///
/// Returns [`KeyError::Entropy`] if `rng` fails.
pub fn generate_key_with<R>(rng: &R) -> Result<Key, KeyError>
where
    R: RandomSource + ?Sized,
{
    let mut bytes = vec![0u8; KEY_LEN];
    rng.fill(&mut bytes)?;
    let key = Key::from_bytes(bytes);
    info!(fingerprint = %key.fingerprint(), "key generated");
    Ok(key)
}

/// Write the raw key bytes to `path`, overwriting any existing file.
///
/// Missing parent directories are created. On unix the file is readable and
/// writable by its owner only (`0o600`), including when it already existed.
///
/// # Errors
///
/// Returns [`KeyError::WriteFailed`] if the directory or file cannot be written.
pub fn store_key(key: &Key, path: &Path) -> Result<(), KeyError> {
    let write_failed = |source| KeyError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_failed)?;
    }
    write_owner_only(path, key.as_bytes()).map_err(write_failed)?;

    info!(path = %path.display(), fingerprint = %key.fingerprint(), "key stored");
    Ok(())
}

fn write_owner_only(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;

    // `mode` only applies on creation; tighten a pre-existing file too.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(bytes)?;
    file.flush()
}

/// Read the full contents of `path` as a key.
///
/// # Errors
///
/// Returns [`KeyError::NotFound`] if `path` does not exist and
/// [`KeyError::Unreadable`] for any other read failure.
pub fn load_key(path: &Path) -> Result<Key, KeyError> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => KeyError::NotFound {
            path: path.to_path_buf(),
        },
        _ => KeyError::Unreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let key = Key::from_bytes(bytes);
    if key.len() != KEY_LEN {
        warn!(
            path = %path.display(),
            len = key.len(),
            expected = KEY_LEN,
            "key file has unexpected length; it will be rejected at encryption time"
        );
    }
    info!(path = %path.display(), fingerprint = %key.fingerprint(), "key loaded");
    Ok(key)
}
