//! Stripe billing provider client
//!
//! Talks to the Stripe REST API directly: form-encoded requests, bearer
//! secret key, JSON responses. Every call is a single attempt bounded by the
//! configured timeout.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::events::parse_event;
use super::signature::WebhookVerifier;
use crate::domain::billing::{
    BillingEvent, BillingProviderClient, CheckoutRequest, CheckoutSession, Customer, Invoice,
    InvoiceLine, UsageRecord,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_provider_call;

const PROVIDER: &str = "stripe";

/// Stripe client configuration
#[derive(Clone)]
pub struct StripeClientConfig {
    /// Base URL of the API, without trailing slash
    pub api_base: String,
    pub secret_key: String,
    pub webhook_secret: String,
    /// Meter event name; when `None`, usage goes to the subscription item
    pub meter_event_name: Option<String>,
    pub timeout: Duration,
    pub signature_tolerance_secs: i64,
}

impl std::fmt::Debug for StripeClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClientConfig")
            .field("api_base", &self.api_base)
            .field("secret_key", &"<redacted>")
            .field("webhook_secret", &"<redacted>")
            .field("meter_event_name", &self.meter_event_name)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Billing provider client backed by Stripe
#[derive(Debug, Clone)]
pub struct StripeBillingClient {
    client: Client,
    config: StripeClientConfig,
    verifier: WebhookVerifier,
}

impl StripeBillingClient {
    pub fn new(config: StripeClientConfig) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        let verifier = WebhookVerifier::new(config.webhook_secret.clone())
            .with_tolerance_secs(config.signature_tolerance_secs);

        Ok(Self {
            client,
            config,
            verifier,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    /// Send a request and decode the JSON body, mapping failures to provider errors
    async fn send<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<T, DomainError> {
        if self.config.secret_key.is_empty() {
            return Err(DomainError::configuration("Stripe secret key is not configured"));
        }

        let started = Instant::now();
        let result = self.execute(operation, request).await;
        record_provider_call(PROVIDER, operation, result.is_ok(), started.elapsed());

        result
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<T, DomainError> {
        let response = request
            .bearer_auth(&self.config.secret_key)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    format!("{}: request timed out", operation)
                } else if e.is_connect() {
                    format!("{}: connection failed", operation)
                } else {
                    format!("{}: request failed: {}", operation, e)
                };
                DomainError::provider(PROVIDER, message)
            })?;

        let status = response.status();

        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("no error message");

            warn!(operation, status = status.as_u16(), "Stripe request failed");
            return Err(DomainError::provider(
                PROVIDER,
                format!("{}: HTTP {}: {}", operation, status.as_u16(), message),
            ));
        }

        response.json().await.map_err(|e| {
            DomainError::provider(
                PROVIDER,
                format!("{}: failed to parse response: {}", operation, e),
            )
        })
    }
}

#[derive(Debug, Deserialize)]
struct StripeCheckoutSession {
    id: String,
    url: Option<String>,
    customer: Option<Value>,
    subscription: Option<Value>,
}

impl From<StripeCheckoutSession> for CheckoutSession {
    fn from(session: StripeCheckoutSession) -> Self {
        // Expandable fields arrive either as an id string or as the object.
        let customer_id = session.customer.as_ref().and_then(|c| match c {
            Value::String(id) => Some(id.clone()),
            other => other.get("id").and_then(Value::as_str).map(str::to_string),
        });

        let subscription_item_id = session
            .subscription
            .as_ref()
            .and_then(|s| s.pointer("/items/data/0/id"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            id: session.id,
            url: session.url,
            customer_id,
            subscription_item_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripeCustomer {
    id: String,
    name: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeInvoice {
    customer: String,
    currency: String,
    total: i64,
    amount_due: i64,
    period_start: Option<i64>,
    period_end: Option<i64>,
    #[serde(default)]
    lines: Option<StripeList<StripeInvoiceLine>>,
}

#[derive(Debug, Deserialize)]
struct StripeList<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct StripeInvoiceLine {
    description: Option<String>,
    quantity: Option<u64>,
    amount: i64,
}

fn from_unix(seconds: Option<i64>) -> Option<DateTime<Utc>> {
    seconds.and_then(|s| DateTime::from_timestamp(s, 0))
}

impl From<StripeInvoice> for Invoice {
    fn from(invoice: StripeInvoice) -> Self {
        Self {
            customer_id: invoice.customer,
            currency: invoice.currency,
            total: invoice.total,
            amount_due: invoice.amount_due,
            period_start: from_unix(invoice.period_start),
            period_end: from_unix(invoice.period_end),
            lines: invoice
                .lines
                .map(|l| l.data)
                .unwrap_or_default()
                .into_iter()
                .map(|line| InvoiceLine {
                    description: line.description,
                    quantity: line.quantity,
                    amount: line.amount,
                })
                .collect(),
        }
    }
}

#[async_trait]
impl BillingProviderClient for StripeBillingClient {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, DomainError> {
        let params = [
            ("mode", "subscription".to_string()),
            ("payment_method_types[0]", "card".to_string()),
            ("line_items[0][price]", request.price_id),
            ("success_url", request.success_url),
            ("cancel_url", request.cancel_url),
        ];

        let session: StripeCheckoutSession = self
            .send(
                "create checkout session",
                self.client.post(self.url("/v1/checkout/sessions")).form(&params),
            )
            .await?;

        info!(session_id = %session.id, "Checkout session created");
        Ok(session.into())
    }

    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, DomainError> {
        let session: StripeCheckoutSession = self
            .send(
                "retrieve checkout session",
                self.client
                    .get(self.url(&format!("/v1/checkout/sessions/{}", session_id)))
                    .query(&[("expand[]", "subscription")]),
            )
            .await?;

        Ok(session.into())
    }

    async fn retrieve_customer(&self, customer_id: &str) -> Result<Customer, DomainError> {
        let customer: StripeCustomer = self
            .send(
                "retrieve customer",
                self.client
                    .get(self.url(&format!("/v1/customers/{}", customer_id))),
            )
            .await?;

        Ok(Customer {
            id: customer.id,
            name: customer.name,
            email: customer.email,
        })
    }

    async fn emit_usage(&self, record: &UsageRecord) -> Result<(), DomainError> {
        let timestamp = record.timestamp.timestamp().to_string();
        let quantity = record.quantity.to_string();

        let request = match (&self.config.meter_event_name, &record.subscription_item_id) {
            (Some(event_name), _) => self.client.post(self.url("/v1/billing/meter_events")).form(&[
                ("event_name", event_name.as_str()),
                ("payload[value]", quantity.as_str()),
                ("payload[stripe_customer_id]", record.account_id.as_str()),
                ("timestamp", timestamp.as_str()),
            ]),
            (None, Some(item_id)) => self
                .client
                .post(self.url(&format!("/v1/subscription_items/{}/usage_records", item_id)))
                .form(&[
                    ("quantity", quantity.as_str()),
                    ("timestamp", timestamp.as_str()),
                    ("action", "increment"),
                ]),
            (None, None) => {
                return Err(DomainError::validation(format!(
                    "Account '{}' has no subscription item to record usage against",
                    record.account_id
                )));
            }
        };

        let _: Value = self.send("emit usage", request).await?;

        debug!(account_id = %record.account_id, quantity = record.quantity, "Usage emitted");
        Ok(())
    }

    async fn upcoming_invoice(&self, customer_id: &str) -> Result<Invoice, DomainError> {
        let invoice: StripeInvoice = self
            .send(
                "retrieve upcoming invoice",
                self.client
                    .get(self.url("/v1/invoices/upcoming"))
                    .query(&[("customer", customer_id)]),
            )
            .await?;

        Ok(invoice.into())
    }

    async fn verify_and_parse_event(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<BillingEvent, DomainError> {
        self.verifier.verify(payload, signature_header)?;
        let event = parse_event(payload)?;

        debug!(event_type = event.event_type(), "Webhook signature verified");
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::AccountId;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SECRET_KEY: &str = "sk_test_123";
    const WEBHOOK_SECRET: &str = "whsec_123";

    fn client_for(server: &MockServer, meter_event_name: Option<&str>) -> StripeBillingClient {
        StripeBillingClient::new(StripeClientConfig {
            api_base: server.uri(),
            secret_key: SECRET_KEY.to_string(),
            webhook_secret: WEBHOOK_SECRET.to_string(),
            meter_event_name: meter_event_name.map(str::to_string),
            timeout: Duration::from_secs(5),
            signature_tolerance_secs: 300,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_checkout_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("authorization", "Bearer sk_test_123"))
            .and(body_string_contains("mode=subscription"))
            .and(body_string_contains("price_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_1",
                "url": "https://checkout.stripe.com/c/pay/cs_test_1",
                "customer": null,
                "subscription": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = client_for(&server, None)
            .create_checkout_session(CheckoutRequest {
                price_id: "price_123".to_string(),
                success_url: "http://localhost/success?session_id={CHECKOUT_SESSION_ID}"
                    .to_string(),
                cancel_url: "http://localhost/cancel".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(session.id, "cs_test_1");
        assert!(session.url.is_some());
        assert_eq!(session.customer_id, None);
    }

    #[tokio::test]
    async fn test_retrieve_checkout_session_with_expanded_subscription() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_test_1"))
            .and(query_param("expand[]", "subscription"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_1",
                "url": null,
                "customer": "cus_1",
                "subscription": {"id": "sub_1", "items": {"data": [{"id": "si_1"}]}}
            })))
            .mount(&server)
            .await;

        let session = client_for(&server, None)
            .retrieve_checkout_session("cs_test_1")
            .await
            .unwrap();

        assert_eq!(session.customer_id.as_deref(), Some("cus_1"));
        assert_eq!(session.subscription_item_id.as_deref(), Some("si_1"));
    }

    #[tokio::test]
    async fn test_retrieve_customer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/customers/cus_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cus_1",
                "name": "Jenny Rosen",
                "email": "jenny@example.com"
            })))
            .mount(&server)
            .await;

        let customer = client_for(&server, None)
            .retrieve_customer("cus_1")
            .await
            .unwrap();

        assert_eq!(customer.name.as_deref(), Some("Jenny Rosen"));
    }

    #[tokio::test]
    async fn test_emit_usage_as_meter_event() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/billing/meter_events"))
            .and(body_string_contains("event_name=api_requests"))
            .and(body_string_contains("cus_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"object": "billing.meter_event"})))
            .expect(1)
            .mount(&server)
            .await;

        let record = UsageRecord::single(AccountId::new("cus_1").unwrap(), None);
        client_for(&server, Some("api_requests"))
            .emit_usage(&record)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_emit_usage_as_subscription_item_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/subscription_items/si_1/usage_records"))
            .and(body_string_contains("action=increment"))
            .and(body_string_contains("quantity=1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "mbur_1"})))
            .expect(1)
            .mount(&server)
            .await;

        let record = UsageRecord::single(AccountId::new("cus_1").unwrap(), Some("si_1".into()));
        client_for(&server, None).emit_usage(&record).await.unwrap();
    }

    #[tokio::test]
    async fn test_emit_usage_without_meter_or_item() {
        let server = MockServer::start().await;

        let record = UsageRecord::single(AccountId::new("cus_1").unwrap(), None);
        let result = client_for(&server, None).emit_usage(&record).await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_provider_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/invoices/upcoming"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"message": "No upcoming invoices for customer: cus_1"}
            })))
            .mount(&server)
            .await;

        let result = client_for(&server, None).upcoming_invoice("cus_1").await;

        match result {
            Err(DomainError::Provider { provider, message }) => {
                assert_eq!(provider, "stripe");
                assert!(message.contains("HTTP 404"));
                assert!(message.contains("No upcoming invoices"));
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upcoming_invoice() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/invoices/upcoming"))
            .and(query_param("customer", "cus_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "customer": "cus_1",
                "currency": "usd",
                "total": 1200,
                "amount_due": 1200,
                "period_start": 1700000000,
                "period_end": 1702592000,
                "lines": {"data": [
                    {"description": "120 × API requests", "quantity": 120, "amount": 1200}
                ]}
            })))
            .mount(&server)
            .await;

        let invoice = client_for(&server, None)
            .upcoming_invoice("cus_1")
            .await
            .unwrap();

        assert_eq!(invoice.total, 1200);
        assert_eq!(invoice.lines.len(), 1);
        assert_eq!(invoice.lines[0].quantity, Some(120));
        assert_eq!(invoice.period_start.unwrap().timestamp(), 1_700_000_000);
    }

    #[tokio::test]
    async fn test_missing_secret_key() {
        let server = MockServer::start().await;
        let mut client = client_for(&server, None);
        client.config.secret_key.clear();

        let result = client.retrieve_customer("cus_1").await;
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_verify_and_parse_event() {
        let server = MockServer::start().await;
        let client = client_for(&server, None);
        let payload = serde_json::to_vec(&json!({
            "type": "invoice.paid",
            "data": {"object": {"customer": "cus_1"}}
        }))
        .unwrap();

        let header = WebhookVerifier::new(WEBHOOK_SECRET)
            .signature_header(&payload, Utc::now().timestamp())
            .unwrap();

        let event = client.verify_and_parse_event(&payload, &header).await.unwrap();
        assert_eq!(
            event,
            BillingEvent::InvoicePaid {
                customer_id: AccountId::new("cus_1").unwrap()
            }
        );

        let result = client.verify_and_parse_event(&payload, "t=1,v1=00").await;
        assert!(matches!(result, Err(DomainError::Signature { .. })));
    }
}
