//! Account and usage views for a presented key

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::api::middleware::RequireAccount;
use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::account::Account;
use crate::domain::billing::Invoice;

/// Public view of an account; never includes the fingerprint
#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub customer_id: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_item_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for CustomerResponse {
    fn from(account: &Account) -> Self {
        Self {
            customer_id: account.id().to_string(),
            active: account.is_active(),
            subscription_item_id: account.subscription_item_id().map(str::to_string),
            created_at: account.created_at(),
            updated_at: account.updated_at(),
        }
    }
}

/// GET /customer
pub async fn get_customer(RequireAccount(account): RequireAccount) -> Json<CustomerResponse> {
    debug!(account_id = %account.id(), "Customer lookup");
    Json(CustomerResponse::from(&account))
}

/// GET /usage
pub async fn get_usage(
    State(state): State<AppState>,
    RequireAccount(account): RequireAccount,
) -> Result<Json<Invoice>, ApiError> {
    let invoice = state.billing.upcoming_invoice(account.id().as_str()).await?;

    debug!(account_id = %account.id(), total = invoice.total, "Upcoming invoice retrieved");

    Ok(Json(invoice))
}
