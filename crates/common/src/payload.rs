//! QR payload strings and the renderer that consumes them.
//!
//! A payload is one of three shapes:
//!
//! ```text
//! mydata:<base64(tag || nonce || ciphertext)>   encrypted message
//! <base64(key)>                                 exported key
//! <text>                                        plaintext, encryption disabled
//! ```
//!
//! Base64 is the standard alphabet with padding. The renderer never sees
//! anything but the final string.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use crate::error::QrError;

/// Literal prefix marking an encrypted payload. No separator follows it.
pub const ENCRYPTED_PREFIX: &str = "mydata:";

/// Errors produced while parsing a payload string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    /// The text after [`ENCRYPTED_PREFIX`] is not valid standard base64.
    #[error("encrypted payload is not valid base64")]
    InvalidBase64,
}

/// The string content of one QR code.
#[derive(Clone, PartialEq, Eq)]
pub enum QrPayload {
    /// Raw envelope bytes, rendered as `mydata:` + base64.
    Encrypted(Vec<u8>),
    /// Base64 of a raw key, rendered without a prefix.
    KeyExport(String),
    /// Literal input text.
    Plain(String),
}

impl QrPayload {
    /// Encode this payload to the exact string handed to the renderer.
    pub fn to_payload_string(&self) -> String {
        match self {
            QrPayload::Encrypted(envelope) => {
                format!("{ENCRYPTED_PREFIX}{}", STANDARD.encode(envelope))
            }
            QrPayload::KeyExport(encoded) => encoded.clone(),
            QrPayload::Plain(text) => text.clone(),
        }
    }

    /// Parse a scanned string.
    ///
    /// Strings carrying [`ENCRYPTED_PREFIX`] become [`QrPayload::Encrypted`];
    /// anything else is [`QrPayload::Plain`]. An exported key cannot be told
    /// apart from plaintext and parses as `Plain`.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::InvalidBase64`] if the prefix is present but the
    /// remainder does not decode.
    pub fn parse(s: &str) -> Result<Self, PayloadError> {
        match s.strip_prefix(ENCRYPTED_PREFIX) {
            Some(encoded) => STANDARD
                .decode(encoded)
                .map(QrPayload::Encrypted)
                .map_err(|_| PayloadError::InvalidBase64),
            None => Ok(QrPayload::Plain(s.to_owned())),
        }
    }

    /// Short label for logs. Never includes the content.
    pub fn kind(&self) -> &'static str {
        match self {
            QrPayload::Encrypted(_) => "encrypted",
            QrPayload::KeyExport(_) => "key_export",
            QrPayload::Plain(_) => "plain",
        }
    }
}

impl fmt::Display for QrPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_payload_string())
    }
}

impl fmt::Debug for QrPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Plain text may be a password and key exports are key material.
        let len = match self {
            QrPayload::Encrypted(b) => b.len(),
            QrPayload::KeyExport(s) | QrPayload::Plain(s) => s.len(),
        };
        write!(f, "QrPayload::{}([REDACTED; {len}])", self.kind())
    }
}

/// External collaborator that turns a payload string into a 2-D barcode.
///
/// Implementations only ever receive the rendered string form; the image
/// representation is theirs alone.
pub trait QrRenderer {
    /// Render one payload.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::Io`] if the output cannot be produced.
    fn render(&mut self, payload: &QrPayload) -> Result<(), QrError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypted_payload_has_prefix_and_padding() {
        let p = QrPayload::Encrypted(vec![0xAB; 29]);
        let s = p.to_payload_string();
        assert!(s.starts_with("mydata:"));
        assert!(s.ends_with('='));
        assert_eq!(QrPayload::parse(&s).unwrap(), p);
    }

    #[test]
    fn key_export_has_no_prefix() {
        let p = QrPayload::KeyExport("AAEC".into());
        assert_eq!(p.to_payload_string(), "AAEC");
    }

    #[test]
    fn plain_passes_through_unchanged() {
        let p = QrPayload::Plain("hunter2 & friends".into());
        assert_eq!(p.to_string(), "hunter2 & friends");
        assert_eq!(QrPayload::parse("hunter2 & friends").unwrap(), p);
    }

    #[test]
    fn parse_rejects_bad_base64_after_prefix() {
        assert_eq!(
            QrPayload::parse("mydata:!!!not base64"),
            Err(PayloadError::InvalidBase64)
        );
    }

    #[test]
    fn prefix_is_case_sensitive() {
        let p = QrPayload::parse("MYDATA:AAAA").unwrap();
        assert_eq!(p.kind(), "plain");
    }

    #[test]
    fn debug_is_redacted() {
        let p = QrPayload::Plain("secret".into());
        let dbg = format!("{p:?}");
        assert!(dbg.contains("REDACTED"));
        assert!(!dbg.contains("secret"));
    }
}
