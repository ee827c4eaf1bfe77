//! Application services

mod purchase_service;
mod usage_reporter;

pub use purchase_service::{CompletedPurchase, EventOutcome, PurchaseService, PurchaseSettings};
pub use usage_reporter::{UsageOutcome, UsageReporter};
