//! Billing provider capability

use async_trait::async_trait;

use super::event::BillingEvent;
use super::types::{CheckoutRequest, CheckoutSession, Customer, Invoice, UsageRecord};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Everything the gateway needs from the subscription-billing provider
///
/// Calls are single attempts; retry policy belongs to the implementation's
/// caller, not to this trait.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BillingProviderClient: Send + Sync {
    /// Start a subscription checkout
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, DomainError>;

    /// Fetch a checkout session, including its customer once paid
    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, DomainError>;

    /// Fetch customer details
    async fn retrieve_customer(&self, customer_id: &str) -> Result<Customer, DomainError>;

    /// Report one usage record
    async fn emit_usage(&self, record: &UsageRecord) -> Result<(), DomainError>;

    /// Fetch the upcoming invoice for a customer
    async fn upcoming_invoice(&self, customer_id: &str) -> Result<Invoice, DomainError>;

    /// Verify a webhook signature and parse its event
    async fn verify_and_parse_event(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<BillingEvent, DomainError>;
}
