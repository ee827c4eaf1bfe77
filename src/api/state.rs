//! Application state for shared services

use std::sync::Arc;

use crate::domain::account::EntitlementStore;
use crate::domain::billing::BillingProviderClient;
use crate::infrastructure::access::AccessGate;
use crate::infrastructure::services::{PurchaseService, UsageReporter};

/// Shared services handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntitlementStore>,
    pub billing: Arc<dyn BillingProviderClient>,
    pub access_gate: AccessGate,
    pub purchase_service: Arc<PurchaseService>,
    pub usage_reporter: Arc<UsageReporter>,
}
