//! Billing Gateway
//!
//! Issues API keys to paying customers, verifies them on every protected
//! request and reports metered usage back to the billing provider:
//! - SHA-256 key fingerprints, plaintext shown exactly once
//! - In-memory entitlement store with atomic key binding
//! - Stripe checkout, webhooks, usage and invoices

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::{BillingProviderClient, DomainError, EntitlementStore};
use infrastructure::{
    access::AccessGate,
    account::InMemoryEntitlementStore,
    api_key::KeyIssuer,
    billing::StripeBillingClient,
    services::{PurchaseService, UsageReporter},
};
use tracing::info;

/// Create the application state with the Stripe client and an empty store
pub fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let billing = StripeBillingClient::new(config.billing.stripe_client_config())?;
    let store = InMemoryEntitlementStore::new();

    if config.billing.price_id.is_empty() {
        tracing::warn!("billing.price_id is not set; checkout will be unavailable");
    }

    info!(
        api_base = %config.billing.api_base,
        key_bytes = config.keys.key_bytes,
        sync_payment_status = config.billing.sync_payment_status,
        "Creating application state"
    );

    let state = create_app_state_with(config, Arc::new(store), Arc::new(billing))?;

    Ok(state)
}

/// Wire the services around a given store and billing provider
pub fn create_app_state_with(
    config: &AppConfig,
    store: Arc<dyn EntitlementStore>,
    billing: Arc<dyn BillingProviderClient>,
) -> Result<AppState, DomainError> {
    let issuer = KeyIssuer::new().with_key_bytes(config.keys.key_bytes)?;

    let purchase_service = PurchaseService::new(
        store.clone(),
        billing.clone(),
        Arc::new(issuer),
        config.billing.purchase_settings(),
    );
    let usage_reporter = UsageReporter::new(billing.clone(), config.billing.usage_timeout());

    Ok(AppState {
        access_gate: AccessGate::new(store.clone()),
        store,
        billing,
        purchase_service: Arc::new(purchase_service),
        usage_reporter: Arc::new(usage_reporter),
    })
}
