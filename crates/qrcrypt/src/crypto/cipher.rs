//! AES-256-GCM encryption and decryption of text messages.
//!
//! **Nonces:** a fresh 96-bit nonce is drawn from a [`RandomSource`] on every
//! call and is never caller-supplied. With random nonces the collision bound
//! is probabilistic; a single key should not seal an unbounded number of
//! messages.
//!
//! **Key length** is checked here and nowhere earlier: loaders accept any
//! file, and a key of the wrong size surfaces as
//! [`CipherError::InvalidKeyLength`] before the cipher is constructed.

use aes_gcm::{
    aead::{AeadInPlace, KeyInit},
    Aes256Gcm, Nonce, Tag,
};
use thiserror::Error;
use tracing::debug;

use super::envelope::{Envelope, NONCE_LEN, TAG_LEN};
use crate::key::Key;
use crate::rng::{EntropyError, OsRandom, RandomSource};

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key is not [`KEY_LEN`] bytes long.
    #[error("invalid key length: expected {KEY_LEN} bytes, got {0}")]
    InvalidKeyLength(usize),

    /// The tag did not verify: wrong key or tampered envelope.
    #[error("authentication failed")]
    AuthenticationFailure,

    /// The envelope is too short to hold a tag and a nonce.
    #[error("malformed envelope: {0} bytes is shorter than the 28-byte header")]
    MalformedEnvelope(usize),

    /// The authenticated plaintext is not valid UTF-8.
    #[error("decrypted plaintext is not valid UTF-8")]
    InvalidUtf8,

    /// No nonce could be drawn.
    #[error(transparent)]
    Entropy(#[from] EntropyError),

    /// AES-GCM encryption failed internally.
    #[error("aead operation failed")]
    AeadFailure,
}

/// Encrypt `plaintext` under `key` with a nonce from the OS CSPRNG.
///
/// # Errors
///
/// See [`encrypt_with`].
pub fn encrypt(plaintext: &str, key: &Key) -> Result<Envelope, CipherError> {
    encrypt_with(plaintext, key, &OsRandom)
}

/// Encrypt `plaintext` under `key`, drawing the nonce from `rng`.
///
/// Empty plaintext is valid and yields a header-only envelope.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not [`KEY_LEN`] bytes.
/// Returns [`CipherError::Entropy`] if `rng` cannot produce a nonce.
pub fn encrypt_with<R>(plaintext: &str, key: &Key, rng: &R) -> Result<Envelope, CipherError>
where
    R: RandomSource + ?Sized,
{
    let cipher = build_cipher(key)?;

    let mut nonce = [0u8; NONCE_LEN];
    rng.fill(&mut nonce)?;

    let mut buffer = plaintext.as_bytes().to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&nonce), b"", &mut buffer)
        .map_err(|_| CipherError::AeadFailure)?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(tag.as_slice());

    debug!(plaintext_len = buffer.len(), "message sealed");
    Ok(Envelope::new(tag_bytes, nonce, buffer))
}

/// Verify and decrypt an [`Envelope`].
///
/// Verification and decryption are one step: on failure no plaintext bytes
/// are returned.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not [`KEY_LEN`] bytes.
/// Returns [`CipherError::AuthenticationFailure`] if the tag does not verify.
/// Returns [`CipherError::InvalidUtf8`] if the verified plaintext is not UTF-8.
pub fn decrypt(envelope: &Envelope, key: &Key) -> Result<String, CipherError> {
    let cipher = build_cipher(key)?;

    let mut buffer = envelope.ciphertext().to_vec();
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(envelope.nonce()),
            b"",
            &mut buffer,
            Tag::from_slice(envelope.tag()),
        )
        .map_err(|_| CipherError::AuthenticationFailure)?;

    debug!(envelope_len = envelope.len(), "message opened");
    String::from_utf8(buffer).map_err(|_| CipherError::InvalidUtf8)
}

/// Split raw envelope bytes and decrypt them.
///
/// # Errors
///
/// Returns [`CipherError::MalformedEnvelope`] if `bytes` is shorter than the
/// header, otherwise the errors of [`decrypt`].
pub fn decrypt_bytes(bytes: &[u8], key: &Key) -> Result<String, CipherError> {
    let envelope = Envelope::from_bytes(bytes)?;
    decrypt(&envelope, key)
}

fn build_cipher(key: &Key) -> Result<Aes256Gcm, CipherError> {
    if key.len() != KEY_LEN {
        return Err(CipherError::InvalidKeyLength(key.len()));
    }
    Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| CipherError::InvalidKeyLength(key.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::envelope::HEADER_LEN;
    use crate::rng::{FixedRandom, MockRandomSource};
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    fn test_key() -> Key {
        Key::from_bytes((0u8..32).collect::<Vec<_>>())
    }

    fn test_nonce() -> FixedRandom {
        FixedRandom::new((0x10u8..0x1c).collect::<Vec<_>>())
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let key = test_key();
        let long = "x".repeat(1000);
        for text in ["", "hello", "wachtwoord123", "ünïcødé ✓", long.as_str()] {
            let env = encrypt(text, &key).unwrap();
            assert_eq!(decrypt(&env, &key).unwrap(), text);
        }
    }

    #[test]
    fn envelope_length_is_header_plus_plaintext() {
        let key = test_key();
        for text in ["", "a", "hello", "ünïcødé"] {
            let env = encrypt(text, &key).unwrap();
            assert_eq!(env.len(), HEADER_LEN + text.len());
            assert_eq!(env.to_bytes().len(), 16 + 12 + text.as_bytes().len());
        }
    }

    #[test]
    fn same_input_gives_different_envelopes() {
        let key = test_key();
        let a = encrypt("hello", &key).unwrap();
        let b = encrypt("hello", &key).unwrap();
        assert_ne!(a.nonce(), b.nonce());
        assert_ne!(a.to_bytes(), b.to_bytes());
        assert_eq!(decrypt(&a, &key).unwrap(), "hello");
        assert_eq!(decrypt(&b, &key).unwrap(), "hello");
    }

    #[test]
    fn golden_hello() {
        let env = encrypt_with("hello", &test_key(), &test_nonce()).unwrap();
        assert_eq!(
            env.encoded_parts().combined,
            "kB09Oy12mVgx35Jr+rc1WhAREhMUFRYXGBkaGxWb9Hom"
        );
        assert_eq!(env.tag().to_vec(), STANDARD.decode("kB09Oy12mVgx35Jr+rc1Wg==").unwrap());
        assert_eq!(env.ciphertext(), &[0x15, 0x9b, 0xf4, 0x7a, 0x26]);
    }

    #[test]
    fn golden_empty_plaintext() {
        let env = encrypt_with("", &test_key(), &test_nonce()).unwrap();
        assert!(env.ciphertext().is_empty());
        assert_eq!(
            env.encoded_parts().combined,
            "AY9enWbm++wDiW7ksejQMBAREhMUFRYXGBkaGw=="
        );
        assert_eq!(decrypt(&env, &test_key()).unwrap(), "");
    }

    #[test]
    fn nonce_comes_from_injected_source() {
        let mut rng = MockRandomSource::new();
        rng.expect_fill().times(1).returning(|dest| {
            dest.fill(0xAA);
            Ok(())
        });
        let env = encrypt_with("x", &test_key(), &rng).unwrap();
        assert_eq!(env.nonce(), &[0xAA; NONCE_LEN]);
    }

    #[test]
    fn entropy_failure_propagates() {
        let mut rng = MockRandomSource::new();
        rng.expect_fill()
            .returning(|_| Err(EntropyError::Unavailable("no device".into())));
        let err = encrypt_with("x", &test_key(), &rng).unwrap_err();
        assert!(matches!(err, CipherError::Entropy(_)));
    }

    #[test]
    fn invalid_key_length_rejected_before_nonce_draw() {
        let mut rng = MockRandomSource::new();
        rng.expect_fill().times(0);
        for len in [0usize, 16, 24, 31, 33] {
            let key = Key::from_bytes(vec![0u8; len]);
            let err = encrypt_with("x", &key, &rng).unwrap_err();
            assert!(matches!(err, CipherError::InvalidKeyLength(n) if n == len));
        }
    }

    #[test]
    fn decrypt_rejects_invalid_key_length() {
        let env = encrypt("x", &test_key()).unwrap();
        let err = decrypt(&env, &Key::from_bytes(vec![0u8; 16])).unwrap_err();
        assert!(matches!(err, CipherError::InvalidKeyLength(16)));
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let env = encrypt("secret", &test_key()).unwrap();
        let other = Key::from_bytes(vec![0x42u8; KEY_LEN]);
        let err = decrypt(&env, &other).unwrap_err();
        assert!(matches!(err, CipherError::AuthenticationFailure));
    }

    #[test]
    fn every_flipped_bit_fails_authentication() {
        let key = test_key();
        let bytes = encrypt("tamper me", &key).unwrap().to_bytes();
        for i in 0..bytes.len() {
            for bit in 0..8 {
                let mut tampered = bytes.clone();
                tampered[i] ^= 1 << bit;
                let err = decrypt_bytes(&tampered, &key).unwrap_err();
                assert!(
                    matches!(err, CipherError::AuthenticationFailure),
                    "byte {i} bit {bit} was accepted"
                );
            }
        }
    }

    #[test]
    fn truncated_envelope_fails() {
        let key = test_key();
        let bytes = encrypt("hello", &key).unwrap().to_bytes();
        assert!(matches!(
            decrypt_bytes(&bytes[..HEADER_LEN + 2], &key),
            Err(CipherError::AuthenticationFailure)
        ));
        assert!(matches!(
            decrypt_bytes(&bytes[..10], &key),
            Err(CipherError::MalformedEnvelope(10))
        ));
    }

    #[test]
    fn non_utf8_plaintext_is_reported() {
        let key = test_key();
        let cipher = build_cipher(&key).unwrap();
        let nonce = [7u8; NONCE_LEN];
        let mut buffer = vec![0xFF, 0xFE];
        let tag = cipher
            .encrypt_in_place_detached(Nonce::from_slice(&nonce), b"", &mut buffer)
            .unwrap();
        let mut tag_bytes = [0u8; TAG_LEN];
        tag_bytes.copy_from_slice(tag.as_slice());
        let env = Envelope::new(tag_bytes, nonce, buffer);
        assert!(matches!(decrypt(&env, &key), Err(CipherError::InvalidUtf8)));
    }
}
