//! Account identifier validation

use thiserror::Error;

/// Errors that can occur during account ID validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AccountValidationError {
    #[error("Account ID cannot be empty")]
    EmptyId,

    #[error("Account ID exceeds maximum length of {0} characters")]
    TooLong(usize),

    #[error("Account ID contains invalid character: {0:?}")]
    InvalidCharacter(char),
}

const MAX_ACCOUNT_ID_LENGTH: usize = 255;

/// Validate a provider-assigned account ID
///
/// Provider ids are opaque, so only the shape is checked:
/// - Cannot be empty
/// - Maximum 255 characters
/// - No whitespace or control characters
pub fn validate_account_id(id: &str) -> Result<(), AccountValidationError> {
    if id.is_empty() {
        return Err(AccountValidationError::EmptyId);
    }

    if id.chars().count() > MAX_ACCOUNT_ID_LENGTH {
        return Err(AccountValidationError::TooLong(MAX_ACCOUNT_ID_LENGTH));
    }

    if let Some(c) = id.chars().find(|c| c.is_whitespace() || c.is_control()) {
        return Err(AccountValidationError::InvalidCharacter(c));
    }

    Ok(())
}
