//! End-to-end operations that turn user input into QR payloads and back.
//!
//! Each call loads or generates at most one key and drops it before
//! returning. Nothing is cached between calls.

use std::path::Path;

use common::payload::{PayloadError, QrPayload};
use common::QrError;
use thiserror::Error;
use tracing::info;

use crate::crypto::{self, CipherError};
use crate::key::{self, Key, KeyError};
use crate::rng::{OsRandom, RandomSource};

/// Errors produced by the payload pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Payload(#[from] PayloadError),
}

impl From<PipelineError> for QrError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Key(e) => QrError::Key(e.to_string()),
            PipelineError::Cipher(e) => QrError::Crypto(e.to_string()),
            PipelineError::Payload(e) => QrError::from(e),
        }
    }
}

/// Payload exporting `key` for a scanning device: base64 of the raw bytes.
pub fn key_payload(key: &Key) -> QrPayload {
    QrPayload::KeyExport(key.to_export())
}

/// Generate a key, store it at `path`, and return its export payload.
///
/// # Errors
///
/// Returns [`PipelineError::Key`] if generation or storage fails.
pub fn new_key(path: &Path) -> Result<QrPayload, PipelineError> {
    new_key_with(path, &OsRandom)
}

/// [`new_key`] with an explicit randomness provider.
///
/// # Errors
///
/// Returns [`PipelineError::Key`] if generation or storage fails.
pub fn new_key_with<R>(path: &Path, rng: &R) -> Result<QrPayload, PipelineError>
where
    R: RandomSource + ?Sized,
{
    let key = key::generate_key_with(rng)?;
    key::store_key(&key, path)?;
    Ok(key_payload(&key))
}

/// Load the key at `key_file` and seal `text` into an encrypted payload.
///
/// # Errors
///
/// Returns [`PipelineError::Key`] if the key file cannot be read and
/// [`PipelineError::Cipher`] if encryption fails, including a key of the
/// wrong length.
pub fn seal_text(key_file: &Path, text: &str) -> Result<QrPayload, PipelineError> {
    seal_text_with(key_file, text, &OsRandom)
}

/// [`seal_text`] with an explicit randomness provider for the nonce.
///
/// # Errors
///
/// See [`seal_text`].
pub fn seal_text_with<R>(key_file: &Path, text: &str, rng: &R) -> Result<QrPayload, PipelineError>
where
    R: RandomSource + ?Sized,
{
    let key = key::load_key(key_file)?;
    let envelope = crypto::encrypt_with(text, &key, rng)?;
    info!(envelope_len = envelope.len(), "text sealed");
    Ok(QrPayload::Encrypted(envelope.to_bytes()))
}

/// Payload for text that is not to be encrypted.
pub fn plain_payload(text: &str) -> QrPayload {
    QrPayload::Plain(text.to_owned())
}

/// Recover the text behind a scanned payload string.
///
/// Encrypted payloads are decrypted under `key`; any other string is returned
/// unchanged. Failures are reported, never replaced by the raw string.
///
/// # Errors
///
/// Returns [`PipelineError::Payload`] for an undecodable `mydata:` string and
/// [`PipelineError::Cipher`] if the envelope is malformed or does not
/// authenticate.
pub fn open_payload(scanned: &str, key: &Key) -> Result<String, PipelineError> {
    match QrPayload::parse(scanned)? {
        QrPayload::Encrypted(bytes) => Ok(crypto::decrypt_bytes(&bytes, key)?),
        other => Ok(other.to_payload_string()),
    }
}
