//! [`Key`]: raw symmetric key bytes, plus the errors of the key lifecycle.

use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::rng::EntropyError;

/// Errors produced by the key layer.
#[derive(Debug, Error)]
pub enum KeyError {
    /// No key could be generated.
    #[error("cannot generate key: {0}")]
    Entropy(#[from] EntropyError),

    /// The key file does not exist.
    #[error("key file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// The key file exists but could not be read.
    #[error("key file unreadable: {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The key file could not be written.
    #[error("cannot write key file {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An exported key string is not valid standard base64.
    #[error("exported key is not valid base64")]
    InvalidExport,
}

/// Raw key bytes as read from a key file.
///
/// The length is not validated here; the cipher rejects anything other than
/// 32 bytes. When this type is dropped the buffer is overwritten with zeroes.
pub struct Key(Vec<u8>);

impl Key {
    /// Wrap raw bytes. Any length is accepted.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Decode the base64 form produced by [`Key::to_export`].
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidExport`] if `encoded` is not standard base64.
    pub fn from_export(encoded: &str) -> Result<Self, KeyError> {
        STANDARD
            .decode(encoded.trim())
            .map(Self)
            .map_err(|_| KeyError::InvalidExport)
    }

    /// Base64 (standard alphabet, padded) of the raw bytes.
    pub fn to_export(&self) -> String {
        STANDARD.encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First 8 bytes of the SHA-256 of the key, hex encoded.
    ///
    /// Safe to log; identifies a key without revealing it.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(&self.0);
        digest[..8].iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Key([REDACTED; {}])", self.0.len())
    }
}
