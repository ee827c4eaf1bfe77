//! Verified webhook events

use serde::Serialize;

use crate::domain::account::AccountId;

/// Event learned from a verified provider webhook
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BillingEvent {
    /// A subscription was created for a customer
    SubscriptionCreated {
        customer_id: AccountId,
        subscription_item_id: Option<String>,
    },
    /// An invoice was paid
    InvoicePaid { customer_id: AccountId },
    /// An invoice payment attempt failed
    InvoicePaymentFailed { customer_id: AccountId },
    /// Any event type the gateway does not act on
    Other { event_type: String },
}

impl BillingEvent {
    /// Provider event type name
    pub fn event_type(&self) -> &str {
        match self {
            Self::SubscriptionCreated { .. } => "customer.subscription.created",
            Self::InvoicePaid { .. } => "invoice.paid",
            Self::InvoicePaymentFailed { .. } => "invoice.payment_failed",
            Self::Other { event_type } => event_type,
        }
    }

    /// Customer the event refers to, if any
    pub fn customer_id(&self) -> Option<&AccountId> {
        match self {
            Self::SubscriptionCreated { customer_id, .. }
            | Self::InvoicePaid { customer_id }
            | Self::InvoicePaymentFailed { customer_id } => Some(customer_id),
            Self::Other { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_names() {
        let customer_id = AccountId::new("cus_1").unwrap();

        assert_eq!(
            BillingEvent::InvoicePaid {
                customer_id: customer_id.clone()
            }
            .event_type(),
            "invoice.paid"
        );
        assert_eq!(
            BillingEvent::Other {
                event_type: "charge.refunded".to_string()
            }
            .event_type(),
            "charge.refunded"
        );
    }

    #[test]
    fn test_customer_id() {
        let customer_id = AccountId::new("cus_1").unwrap();
        let event = BillingEvent::InvoicePaymentFailed {
            customer_id: customer_id.clone(),
        };

        assert_eq!(event.customer_id(), Some(&customer_id));
        assert_eq!(
            BillingEvent::Other {
                event_type: "x".to_string()
            }
            .customer_id(),
            None
        );
    }
}
