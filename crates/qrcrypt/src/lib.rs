//! `qrcrypt`: encrypt short text under a locally stored key and turn the result
//! into a QR payload string.
//!
//! The library is split along the two responsibilities of the tool:
//! - [`key`]: generate, store, load, and export the 256-bit key.
//! - [`crypto`]: seal text into a `tag || nonce || ciphertext` envelope and
//!   open it again.
//!
//! [`pipeline`] wires them to the payload grammar in [`common::payload`].
//! Randomness always flows through [`rng::RandomSource`] so tests can pin it.

pub mod cli;
pub mod config;
pub mod crypto;
pub mod key;
pub mod pipeline;
pub mod render;
pub mod rng;
pub mod telemetry;
