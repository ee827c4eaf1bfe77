//! Purchase service - Turns completed checkouts and billing events into
//! entitlement changes

use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::account::{Account, AccountId, EntitlementStore};
use crate::domain::api_key::IssuedKey;
use crate::domain::billing::{
    BillingEvent, BillingProviderClient, CheckoutRequest, CheckoutSession, Customer,
};
use crate::domain::DomainError;
use crate::infrastructure::api_key::KeyIssuer;

/// Checkout and event-handling settings
#[derive(Debug, Clone)]
pub struct PurchaseSettings {
    pub price_id: String,
    pub success_url: String,
    pub cancel_url: String,
    /// Let invoice events flip the active flag
    pub sync_payment_status: bool,
}

/// Result of completing a checkout
#[derive(Debug)]
pub struct CompletedPurchase {
    pub account: Account,
    pub customer: Customer,
    /// The only time the plaintext key is available
    pub key: IssuedKey,
}

/// What handling a billing event did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EventOutcome {
    SubscriptionItemAttached { account_id: AccountId },
    EntitlementChanged { account_id: AccountId, active: bool },
    UnknownAccount { account_id: AccountId },
    Ignored { event_type: String },
}

/// Purchase-completion handler
pub struct PurchaseService {
    store: Arc<dyn EntitlementStore>,
    billing: Arc<dyn BillingProviderClient>,
    issuer: Arc<KeyIssuer>,
    settings: PurchaseSettings,
}

impl PurchaseService {
    pub fn new(
        store: Arc<dyn EntitlementStore>,
        billing: Arc<dyn BillingProviderClient>,
        issuer: Arc<KeyIssuer>,
        settings: PurchaseSettings,
    ) -> Self {
        Self {
            store,
            billing,
            issuer,
            settings,
        }
    }

    /// Start a subscription checkout for the configured price
    pub async fn start_checkout(&self) -> Result<CheckoutSession, DomainError> {
        if self.settings.price_id.is_empty() {
            return Err(DomainError::configuration("Billing price id is not configured"));
        }

        self.billing
            .create_checkout_session(CheckoutRequest {
                price_id: self.settings.price_id.clone(),
                success_url: self.settings.success_url.clone(),
                cancel_url: self.settings.cancel_url.clone(),
            })
            .await
    }

    /// Complete a paid checkout: issue and bind a key for its customer
    pub async fn complete_checkout(&self, session_id: &str) -> Result<CompletedPurchase, DomainError> {
        if session_id.trim().is_empty() {
            return Err(DomainError::invalid_input("session_id is required"));
        }

        // Interpolated into the provider URL path
        if !session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(DomainError::invalid_input("session_id has an invalid format"));
        }

        let session = self.billing.retrieve_checkout_session(session_id).await?;

        let customer_id = session.customer_id.ok_or_else(|| {
            DomainError::validation(format!("Checkout session '{}' has no customer yet", session_id))
        })?;
        let account_id =
            AccountId::new(customer_id).map_err(|e| DomainError::validation(e.to_string()))?;

        let customer = self.billing.retrieve_customer(account_id.as_str()).await?;

        let key = self
            .store
            .register_issued(
                &account_id,
                session.subscription_item_id,
                self.issuer.as_ref(),
            )
            .await?;

        let account = self
            .store
            .get(&account_id)
            .await?
            .ok_or_else(|| DomainError::internal(format!("Account '{}' vanished after registration", account_id)))?;

        counter!("api_keys_issued_total").increment(1);
        info!(account_id = %account_id, "Customer subscribed, API key issued");

        Ok(CompletedPurchase {
            account,
            customer,
            key,
        })
    }

    /// Apply a verified billing event
    pub async fn handle_event(&self, event: BillingEvent) -> Result<EventOutcome, DomainError> {
        let event_type = event.event_type().to_string();

        let outcome = match event {
            BillingEvent::SubscriptionCreated {
                customer_id,
                subscription_item_id: Some(item_id),
            } => {
                let result = self.store.set_subscription_item(&customer_id, &item_id).await;
                self.outcome(customer_id, result, |account_id, _| {
                    EventOutcome::SubscriptionItemAttached { account_id }
                })?
            }
            BillingEvent::InvoicePaid { customer_id } if self.settings.sync_payment_status => {
                self.set_active(customer_id, true).await?
            }
            BillingEvent::InvoicePaymentFailed { customer_id }
                if self.settings.sync_payment_status =>
            {
                self.set_active(customer_id, false).await?
            }
            BillingEvent::InvoicePaymentFailed { customer_id } => {
                warn!(
                    account_id = %customer_id,
                    "Invoice payment failed; entitlement left unchanged"
                );
                EventOutcome::Ignored { event_type }
            }
            _ => EventOutcome::Ignored { event_type },
        };

        info!(outcome = ?outcome, "Billing event handled");
        Ok(outcome)
    }

    async fn set_active(
        &self,
        account_id: AccountId,
        active: bool,
    ) -> Result<EventOutcome, DomainError> {
        let result = self.store.set_active(&account_id, active).await;
        self.outcome(account_id, result, |account_id, account| {
            EventOutcome::EntitlementChanged {
                account_id,
                active: account.is_active(),
            }
        })
    }

    fn outcome(
        &self,
        account_id: AccountId,
        result: Result<Account, DomainError>,
        on_success: impl FnOnce(AccountId, &Account) -> EventOutcome,
    ) -> Result<EventOutcome, DomainError> {
        match result {
            Ok(account) => Ok(on_success(account_id, &account)),
            Err(DomainError::NotFound { .. }) => {
                info!(account_id = %account_id, "Billing event for an account without a key");
                Ok(EventOutcome::UnknownAccount { account_id })
            }
            Err(e) => Err(e),
        }
    }
}
