//! Account domain
//!
//! Paying accounts and the entitlement store that owns them.

mod entity;
mod repository;
mod validation;

pub use entity::{Account, AccountId};
pub use repository::EntitlementStore;
pub use validation::{validate_account_id, AccountValidationError};
