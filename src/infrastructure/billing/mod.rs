//! Billing provider implementations

mod events;
mod signature;
mod stripe;

pub use events::parse_event;
pub use signature::{WebhookVerifier, DEFAULT_TOLERANCE_SECS};
pub use stripe::{StripeBillingClient, StripeClientConfig};
