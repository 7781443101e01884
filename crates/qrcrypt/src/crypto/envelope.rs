//! [`Envelope`]: the byte framing of one encrypted message.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;

use super::cipher::CipherError;

/// Byte length of the GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// Byte length of the GCM nonce (96 bits).
pub const NONCE_LEN: usize = 12;

/// Fixed-length prefix of every envelope: tag followed by nonce.
pub const HEADER_LEN: usize = TAG_LEN + NONCE_LEN;

/// A sealed message: `tag || nonce || ciphertext`.
///
/// Produced by [`super::encrypt`] and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    tag: [u8; TAG_LEN],
    nonce: [u8; NONCE_LEN],
    ciphertext: Vec<u8>,
}

/// Individually base64-encoded envelope fields.
///
/// `combined` is the only field that ends up in a QR code; the others are
/// kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedParts {
    pub cipher_text: String,
    pub nonce: String,
    pub tag: String,
    pub combined: String,
}

impl Envelope {
    pub(crate) fn new(tag: [u8; TAG_LEN], nonce: [u8; NONCE_LEN], ciphertext: Vec<u8>) -> Self {
        Self {
            tag,
            nonce,
            ciphertext,
        }
    }

    /// Split raw bytes into tag, nonce, and ciphertext by fixed offsets.
    ///
    /// Nothing is authenticated here; that happens in [`super::decrypt`].
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::MalformedEnvelope`] if `bytes` is shorter than
    /// [`HEADER_LEN`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CipherError> {
        if bytes.len() < HEADER_LEN {
            return Err(CipherError::MalformedEnvelope(bytes.len()));
        }
        let (tag_bytes, rest) = bytes.split_at(TAG_LEN);
        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(tag_bytes);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(nonce_bytes);

        Ok(Self::new(tag, nonce, ciphertext.to_vec()))
    }

    /// Concatenate the fields into the wire form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        out.extend_from_slice(&self.tag);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Total encoded length: [`HEADER_LEN`] plus the ciphertext length.
    pub fn len(&self) -> usize {
        HEADER_LEN + self.ciphertext.len()
    }

    /// Always `false`; an envelope carries at least its header.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn tag(&self) -> &[u8; TAG_LEN] {
        &self.tag
    }

    pub fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Base64 (standard alphabet, padded) of each field and of the whole.
    pub fn encoded_parts(&self) -> EncodedParts {
        EncodedParts {
            cipher_text: STANDARD.encode(&self.ciphertext),
            nonce: STANDARD.encode(self.nonce),
            tag: STANDARD.encode(self.tag),
            combined: STANDARD.encode(self.to_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Envelope {
        Envelope::new([0x11; TAG_LEN], [0x22; NONCE_LEN], vec![0x33, 0x44, 0x55])
    }

    #[test]
    fn wire_layout_is_tag_nonce_ciphertext() {
        let bytes = sample().to_bytes();
        assert_eq!(bytes.len(), 31);
        assert!(bytes[..16].iter().all(|&b| b == 0x11));
        assert!(bytes[16..28].iter().all(|&b| b == 0x22));
        assert_eq!(&bytes[28..], &[0x33, 0x44, 0x55]);
    }

    #[test]
    fn from_bytes_splits_at_fixed_offsets() {
        let env = sample();
        let parsed = Envelope::from_bytes(&env.to_bytes()).unwrap();
        assert_eq!(parsed, env);
    }

    #[test]
    fn header_only_envelope_is_accepted() {
        let env = Envelope::from_bytes(&[0u8; HEADER_LEN]).unwrap();
        assert!(env.ciphertext().is_empty());
        assert_eq!(env.len(), HEADER_LEN);
    }

    #[test]
    fn short_input_is_malformed() {
        let err = Envelope::from_bytes(&[0u8; HEADER_LEN - 1]).unwrap_err();
        assert!(matches!(err, CipherError::MalformedEnvelope(27)));
    }

    #[test]
    fn encoded_parts_use_padded_standard_base64() {
        let parts = sample().encoded_parts();
        assert_eq!(parts.tag, "EREREREREREREREREREREQ==");
        assert_eq!(parts.nonce, "IiIiIiIiIiIiIiIi");
        assert_eq!(parts.cipher_text, "M0RV");
        assert_eq!(parts.combined, "ERERERERERERERERERERESIiIiIiIiIiIiIiIjNEVQ==");
    }
}
