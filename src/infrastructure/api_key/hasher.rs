//! API key hashing
//!
//! Turns a plaintext key into the fingerprint that is stored and compared.

use sha2::{Digest, Sha256};

use crate::domain::api_key::{validate_plaintext_key, Fingerprint};
use crate::domain::DomainError;

/// SHA-256 over the raw key bytes, lowercase hex encoded
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyHasher;

impl KeyHasher {
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext key
    ///
    /// Fails with `InvalidInput` only for the empty string.
    pub fn hash(&self, plaintext: &str) -> Result<Fingerprint, DomainError> {
        validate_plaintext_key(plaintext).map_err(|e| DomainError::invalid_input(e.to_string()))?;

        Ok(self.digest(plaintext))
    }

    /// Hash without validating; callers must guarantee a non-empty key
    pub(crate) fn digest(&self, plaintext: &str) -> Fingerprint {
        let digest = Sha256::digest(plaintext.as_bytes());
        Fingerprint::from_digest_hex(hex::encode(digest))
    }

    /// Check a plaintext key against a stored fingerprint
    pub fn verify(&self, plaintext: &str, stored: &Fingerprint) -> bool {
        match self.hash(plaintext) {
            Ok(computed) => constant_time_compare(computed.as_str(), stored.as_str()),
            Err(_) => false,
        }
    }
}

/// Constant-time string comparison to prevent timing attacks
pub(crate) fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
