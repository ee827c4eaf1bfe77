//! Fingerprint and issued key types

use serde::{Deserialize, Serialize};

use super::validation::{validate_fingerprint, ApiKeyValidationError};

/// One-way digest of a plaintext API key, safe to store and compare
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Parse a stored fingerprint, validating its format
    pub fn parse(value: impl Into<String>) -> Result<Self, ApiKeyValidationError> {
        let value = value.into();
        validate_fingerprint(&value)?;
        Ok(Self(value))
    }

    /// Wrap a digest that is already known to be well formed
    pub(crate) fn from_digest_hex(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = ApiKeyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> Self {
        fp.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A freshly issued key
///
/// The plaintext is handed to the caller once and is never stored.
#[derive(Clone)]
pub struct IssuedKey {
    pub plaintext: String,
    pub fingerprint: Fingerprint,
}

impl std::fmt::Debug for IssuedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedKey")
            .field("plaintext", &"<redacted>")
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// Source of new keys, checked against the set of fingerprints already taken
///
/// Stores call this while holding their write lock so the collision check and
/// the insert happen under the same exclusion.
pub trait KeySource: Send + Sync {
    fn issue(&self, is_taken: &dyn Fn(&Fingerprint) -> bool) -> IssuedKey;
}
