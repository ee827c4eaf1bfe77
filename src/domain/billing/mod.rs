//! Billing provider domain
//!
//! Provider-neutral shapes for checkout, customers, invoices, usage and
//! webhook events, plus the [`BillingProviderClient`] capability that the
//! rest of the gateway talks to.

mod event;
mod provider;
mod types;

pub use event::BillingEvent;
pub use provider::BillingProviderClient;
pub use types::{
    CheckoutRequest, CheckoutSession, Customer, Invoice, InvoiceLine, UsageRecord,
};

#[cfg(test)]
pub use provider::MockBillingProviderClient;
