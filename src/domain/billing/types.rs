//! Provider-neutral billing types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::account::AccountId;

/// Request to start a subscription checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// Price of the metered subscription
    pub price_id: String,
    /// Redirect after payment; may contain the provider's session placeholder
    pub success_url: String,
    /// Redirect when the customer abandons checkout
    pub cancel_url: String,
}

/// Checkout session as seen by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Set once the customer has completed payment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_item_id: Option<String>,
}

/// Customer details used for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// One metering event attributable to a single granted request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    pub account_id: AccountId,
    pub subscription_item_id: Option<String>,
    pub quantity: u64,
    pub timestamp: DateTime<Utc>,
}

impl UsageRecord {
    /// A single unit of usage recorded now
    pub fn single(account_id: AccountId, subscription_item_id: Option<String>) -> Self {
        Self {
            account_id,
            subscription_item_id,
            quantity: 1,
            timestamp: Utc::now(),
        }
    }
}

/// Upcoming invoice summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub customer_id: String,
    pub currency: String,
    /// Amounts are in the currency's minor unit
    pub total: i64,
    pub amount_due: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lines: Vec<InvoiceLine>,
}

/// Invoice line item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub description: Option<String>,
    pub quantity: Option<u64>,
    pub amount: i64,
}
