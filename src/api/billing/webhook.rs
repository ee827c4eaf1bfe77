//! Billing provider webhook handler

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde::Serialize;
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::infrastructure::services::EventOutcome;

pub const SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub received: bool,
    #[serde(flatten)]
    pub outcome: EventOutcome,
}

/// POST /webhook
///
/// The raw body is verified before it is parsed. A bad or missing
/// signature is a 400 and touches nothing.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            ApiError::bad_request("Missing Stripe-Signature header").with_code("missing_signature")
        })?;

    let event = state
        .billing
        .verify_and_parse_event(&body, signature)
        .await?;

    info!(event_type = event.event_type(), "Webhook event received");

    let outcome = state.purchase_service.handle_event(event).await?;

    Ok(Json(WebhookResponse {
        received: true,
        outcome,
    }))
}
