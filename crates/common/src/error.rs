//! Common error types shared across crates.

use thiserror::Error;

use crate::payload::PayloadError;

/// Top-level error type.
///
/// Variants map to process exit codes returned by the `qrcrypt` binary:
/// - [`QrError::Io`] → 1
/// - [`QrError::Usage`] → 2
/// - [`QrError::Key`] → 3
/// - [`QrError::Crypto`] → 4
/// - [`QrError::Payload`] → 5
#[derive(Debug, Error)]
pub enum QrError {
    /// The command line could not be understood.
    #[error("usage error: {0}")]
    Usage(String),

    /// The key could not be generated, stored, or loaded.
    #[error("key error: {0}")]
    Key(String),

    /// Encryption or decryption failed, including authentication failures.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// A payload string did not follow the expected grammar.
    #[error("payload error: {0}")]
    Payload(String),

    /// Reading input or writing output failed.
    #[error("i/o error: {0}")]
    Io(String),
}

impl QrError {
    /// Returns the exit code the binary should terminate with for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            QrError::Io(_) => 1,
            QrError::Usage(_) => 2,
            QrError::Key(_) => 3,
            QrError::Crypto(_) => 4,
            QrError::Payload(_) => 5,
        }
    }
}

impl From<PayloadError> for QrError {
    fn from(e: PayloadError) -> Self {
        QrError::Payload(e.to_string())
    }
}

impl From<std::io::Error> for QrError {
    fn from(e: std::io::Error) -> Self {
        QrError::Io(e.to_string())
    }
}
