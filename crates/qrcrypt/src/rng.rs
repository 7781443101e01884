//! Process-wide randomness provider.
//!
//! Key generation and nonce generation both draw from a [`RandomSource`].
//! Production code uses [`OsRandom`], which reads the operating system CSPRNG
//! on every call and never falls back to a seeded generator.

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use thiserror::Error;

/// Errors produced by a randomness provider.
#[derive(Debug, Error)]
pub enum EntropyError {
    /// The platform entropy source could not be read. Not retried.
    #[error("entropy source unavailable: {0}")]
    Unavailable(String),
}

/// A source of cryptographically secure random bytes.
#[cfg_attr(test, mockall::automock)]
pub trait RandomSource {
    /// Fill `dest` entirely with random bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EntropyError::Unavailable`] if the source cannot be read.
    fn fill(&self, dest: &mut [u8]) -> Result<(), EntropyError>;
}

/// The operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<(), EntropyError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| EntropyError::Unavailable(e.to_string()))
    }
}

/// Deterministic source that hands out the same leading bytes on every call.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct FixedRandom {
    bytes: Vec<u8>,
}

#[cfg(test)]
impl FixedRandom {
    pub(crate) fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

#[cfg(test)]
impl RandomSource for FixedRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<(), EntropyError> {
        let src = self
            .bytes
            .get(..dest.len())
            .ok_or_else(|| EntropyError::Unavailable("fixed source too short".into()))?;
        dest.copy_from_slice(src);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_random_fills_buffer() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        OsRandom.fill(&mut a).unwrap();
        OsRandom.fill(&mut b).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn fixed_random_repeats() {
        let rng = FixedRandom::new(vec![1, 2, 3, 4]);
        let mut a = [0u8; 3];
        let mut b = [0u8; 3];
        rng.fill(&mut a).unwrap();
        rng.fill(&mut b).unwrap();
        assert_eq!(a, [1, 2, 3]);
        assert_eq!(a, b);
    }

    #[test]
    fn fixed_random_too_short_fails() {
        let rng = FixedRandom::new(vec![0u8; 4]);
        let mut buf = [0u8; 12];
        assert!(matches!(
            rng.fill(&mut buf),
            Err(EntropyError::Unavailable(_))
        ));
    }
}
