//! Webhook event parsing

use serde::Deserialize;
use serde_json::Value;

use crate::domain::account::AccountId;
use crate::domain::billing::BillingEvent;
use crate::domain::DomainError;

#[derive(Debug, Deserialize)]
struct EventEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: Value,
}

/// Parse a verified webhook body into a [`BillingEvent`]
pub fn parse_event(payload: &[u8]) -> Result<BillingEvent, DomainError> {
    let envelope: EventEnvelope = serde_json::from_slice(payload)
        .map_err(|e| DomainError::invalid_input(format!("Malformed webhook payload: {}", e)))?;

    let object = &envelope.data.object;

    let event = match envelope.event_type.as_str() {
        "customer.subscription.created" => BillingEvent::SubscriptionCreated {
            customer_id: customer_of(object)?,
            subscription_item_id: object
                .pointer("/items/data/0/id")
                .and_then(Value::as_str)
                .map(str::to_string),
        },
        "invoice.paid" => BillingEvent::InvoicePaid {
            customer_id: customer_of(object)?,
        },
        "invoice.payment_failed" => BillingEvent::InvoicePaymentFailed {
            customer_id: customer_of(object)?,
        },
        _ => BillingEvent::Other {
            event_type: envelope.event_type,
        },
    };

    Ok(event)
}

fn customer_of(object: &Value) -> Result<AccountId, DomainError> {
    let customer = object
        .get("customer")
        .and_then(Value::as_str)
        .ok_or_else(|| DomainError::invalid_input("Webhook event object has no customer"))?;

    AccountId::new(customer).map_err(|e| DomainError::invalid_input(e.to_string()))
}
