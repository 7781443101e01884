//! AES-256-GCM envelope encryption of short text messages.
//!
//! This module is free of file I/O. It provides the seal/open operations used
//! by the payload pipeline.
//!
//! # Envelope format
//!
//! ```text
//! tag (16 bytes) || nonce (12 bytes) || ciphertext (len(plaintext) bytes)
//! ```
//!
//! No associated data is bound. The ciphertext carries no padding, so an
//! envelope is always exactly 28 bytes longer than the UTF-8 plaintext.

pub mod cipher;
pub mod envelope;

pub use cipher::{decrypt, decrypt_bytes, encrypt, encrypt_with, CipherError, KEY_LEN};
pub use envelope::{EncodedParts, Envelope, HEADER_LEN, NONCE_LEN, TAG_LEN};
