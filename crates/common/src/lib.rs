//! Common types shared across `qrcrypt` crates: the error taxonomy surfaced to
//! callers and the grammar of the strings handed to a QR renderer.

pub mod error;
pub mod payload;

pub use error::QrError;
pub use payload::{QrPayload, QrRenderer, ENCRYPTED_PREFIX};
