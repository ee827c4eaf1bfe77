//! Domain layer - Core business logic and entities

pub mod access;
pub mod account;
pub mod api_key;
pub mod billing;
pub mod error;

pub use access::AuthDecision;
pub use account::{Account, AccountId, AccountValidationError, EntitlementStore};
pub use api_key::{ApiKeyValidationError, Fingerprint, IssuedKey, KeySource};
pub use billing::{
    BillingEvent, BillingProviderClient, CheckoutRequest, CheckoutSession, Customer, Invoice,
    InvoiceLine, UsageRecord,
};
pub use error::DomainError;
