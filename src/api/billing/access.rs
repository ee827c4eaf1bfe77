//! The metered, key-gated endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::debug;

use crate::api::middleware::RequireEntitlement;
use crate::api::state::AppState;

#[derive(Debug, Serialize)]
pub struct ApiAccessResponse {
    pub data: String,
    pub customer_id: String,
}

/// GET /api
///
/// Reaching the handler means access was granted. Exactly one usage record
/// is emitted; its outcome never changes the response.
pub async fn api_access(
    State(state): State<AppState>,
    entitlement: RequireEntitlement,
) -> Json<ApiAccessResponse> {
    let outcome = state
        .usage_reporter
        .report(
            &entitlement.account_id,
            entitlement.subscription_item_id.as_deref(),
        )
        .await;

    debug!(
        account_id = %entitlement.account_id,
        usage = outcome.as_str(),
        "Metered request served"
    );

    Json(ApiAccessResponse {
        data: "You made a successful API request".to_string(),
        customer_id: entitlement.account_id.to_string(),
    })
}
