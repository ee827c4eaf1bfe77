//! API key and fingerprint validation utilities

use thiserror::Error;

/// Errors that can occur while validating key material
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiKeyValidationError {
    #[error("API key cannot be empty")]
    EmptyKey,

    #[error("Fingerprint must be exactly {0} characters")]
    InvalidFingerprintLength(usize),

    #[error("Fingerprint contains invalid character: '{0}'. Only lowercase hex digits are allowed")]
    InvalidFingerprintCharacter(char),
}

/// Length of a hex-encoded SHA-256 digest
pub const FINGERPRINT_LENGTH: usize = 64;

/// Validate a plaintext API key before hashing
pub fn validate_plaintext_key(key: &str) -> Result<(), ApiKeyValidationError> {
    if key.is_empty() {
        return Err(ApiKeyValidationError::EmptyKey);
    }

    Ok(())
}

/// Validate a stored fingerprint
///
/// Rules:
/// - Exactly 64 characters
/// - Lowercase hex digits only
pub fn validate_fingerprint(value: &str) -> Result<(), ApiKeyValidationError> {
    if value.len() != FINGERPRINT_LENGTH {
        return Err(ApiKeyValidationError::InvalidFingerprintLength(
            FINGERPRINT_LENGTH,
        ));
    }

    if let Some(c) = value
        .chars()
        .find(|c| !matches!(c, '0'..='9' | 'a'..='f'))
    {
        return Err(ApiKeyValidationError::InvalidFingerprintCharacter(c));
    }

    Ok(())
}
