//! API key issuance
//!
//! Draws cryptographically random keys and rejects any whose fingerprint is
//! already taken.

use rand::RngCore;
use tracing::{debug, warn};

use super::hasher::KeyHasher;
use crate::domain::api_key::{Fingerprint, IssuedKey, KeySource};
use crate::domain::DomainError;

/// Minimum number of random bytes per key
pub const MIN_KEY_BYTES: usize = 16;

/// Source of random bytes for new keys
pub trait RandomSource: Send + Sync + std::fmt::Debug {
    /// Fill `buf` completely. An exhausted source is a fatal environment error.
    fn fill(&self, buf: &mut [u8]);
}

/// Operating system CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, buf: &mut [u8]) {
        rand::rngs::OsRng.fill_bytes(buf);
    }
}

/// Issuer of new API keys
#[derive(Debug)]
pub struct KeyIssuer {
    hasher: KeyHasher,
    random: Box<dyn RandomSource>,
    key_bytes: usize,
}

impl KeyIssuer {
    /// Create an issuer drawing 16 bytes from the OS random source
    pub fn new() -> Self {
        Self {
            hasher: KeyHasher::new(),
            random: Box::new(OsRandom),
            key_bytes: MIN_KEY_BYTES,
        }
    }

    /// Set the number of random bytes per key (at least 16)
    pub fn with_key_bytes(mut self, bytes: usize) -> Result<Self, DomainError> {
        if bytes < MIN_KEY_BYTES {
            return Err(DomainError::configuration(format!(
                "key_bytes must be at least {}, got {}",
                MIN_KEY_BYTES, bytes
            )));
        }

        self.key_bytes = bytes;
        Ok(self)
    }

    /// Replace the random source
    pub fn with_random_source(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Box::new(random);
        self
    }

    pub fn key_bytes(&self) -> usize {
        self.key_bytes
    }

    /// Draw one candidate key without any collision check
    fn draw(&self) -> IssuedKey {
        let mut random_bytes = vec![0u8; self.key_bytes];
        self.random.fill(&mut random_bytes);

        let plaintext = hex::encode(&random_bytes);
        let fingerprint = self.hasher.digest(&plaintext);

        IssuedKey {
            plaintext,
            fingerprint,
        }
    }
}

impl KeySource for KeyIssuer {
    fn issue(&self, is_taken: &dyn Fn(&Fingerprint) -> bool) -> IssuedKey {
        let mut attempts: u64 = 0;

        loop {
            attempts += 1;
            let candidate = self.draw();

            if !is_taken(&candidate.fingerprint) {
                debug!(attempts, "Issued new API key");
                return candidate;
            }

            warn!(
                fingerprint = %candidate.fingerprint,
                attempts,
                "Fingerprint collision while issuing API key, redrawing"
            );
        }
    }
}

impl Default for KeyIssuer {
    fn default() -> Self {
        Self::new()
    }
}
