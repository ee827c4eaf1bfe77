//! Billing gateway endpoints

pub mod access;
pub mod account;
pub mod checkout;
pub mod webhook;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

/// Create the billing router
pub fn create_billing_router() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(checkout::create_checkout))
        .route("/success", get(checkout::checkout_success))
        .route("/webhook", post(webhook::handle_webhook))
        .route("/customer", get(account::get_customer))
        .route("/usage", get(account::get_usage))
        .route("/api", get(access::api_access))
}
