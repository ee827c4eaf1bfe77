//! API Key domain
//!
//! Key material types shared by hashing, issuance and the entitlement store.
//! Plaintext keys only ever live in an [`IssuedKey`]; everything that is
//! stored or compared is a [`Fingerprint`].

mod fingerprint;
mod validation;

pub use fingerprint::{Fingerprint, IssuedKey, KeySource};
pub use validation::{
    validate_fingerprint, validate_plaintext_key, ApiKeyValidationError, FINGERPRINT_LENGTH,
};
