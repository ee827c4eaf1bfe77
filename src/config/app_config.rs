use std::time::Duration;

use serde::Deserialize;

use crate::infrastructure::api_key::MIN_KEY_BYTES;
use crate::infrastructure::billing::{StripeClientConfig, DEFAULT_TOLERANCE_SECS};
use crate::infrastructure::observability::ObservabilityConfig;
use crate::infrastructure::services::PurchaseSettings;

/// Placeholder the provider substitutes with the real session id on redirect
const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub billing: BillingConfig,
    #[serde(default)]
    pub keys: KeysConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Billing provider settings
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    pub api_base: String,
    pub secret_key: String,
    pub price_id: String,
    pub webhook_secret: String,
    /// Externally reachable base URL used for checkout redirects
    pub public_base_url: String,
    /// Empty string selects legacy subscription-item usage records
    pub meter_event_name: String,
    pub request_timeout_ms: u64,
    pub usage_timeout_ms: u64,
    pub signature_tolerance_secs: i64,
    /// Let invoice webhooks flip the account's active flag
    pub sync_payment_status: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    /// Random bytes per issued key
    pub key_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.stripe.com".to_string(),
            secret_key: String::new(),
            price_id: String::new(),
            webhook_secret: String::new(),
            public_base_url: "http://localhost:8080".to_string(),
            meter_event_name: "api_requests".to_string(),
            request_timeout_ms: 10_000,
            usage_timeout_ms: 2_000,
            signature_tolerance_secs: DEFAULT_TOLERANCE_SECS,
            sync_payment_status: false,
        }
    }
}

impl std::fmt::Debug for BillingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingConfig")
            .field("api_base", &self.api_base)
            .field("secret_key", &"<redacted>")
            .field("price_id", &self.price_id)
            .field("webhook_secret", &"<redacted>")
            .field("public_base_url", &self.public_base_url)
            .field("meter_event_name", &self.meter_event_name)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("usage_timeout_ms", &self.usage_timeout_ms)
            .field("sync_payment_status", &self.sync_payment_status)
            .finish()
    }
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            key_bytes: MIN_KEY_BYTES,
        }
    }
}

impl BillingConfig {
    pub fn usage_timeout(&self) -> Duration {
        Duration::from_millis(self.usage_timeout_ms)
    }

    pub fn stripe_client_config(&self) -> StripeClientConfig {
        let meter_event_name = match self.meter_event_name.trim() {
            "" => None,
            name => Some(name.to_string()),
        };

        StripeClientConfig {
            api_base: self.api_base.clone(),
            secret_key: self.secret_key.clone(),
            webhook_secret: self.webhook_secret.clone(),
            meter_event_name,
            timeout: Duration::from_millis(self.request_timeout_ms),
            signature_tolerance_secs: self.signature_tolerance_secs,
        }
    }

    pub fn purchase_settings(&self) -> PurchaseSettings {
        let base = self.public_base_url.trim_end_matches('/');

        PurchaseSettings {
            price_id: self.price_id.clone(),
            success_url: format!("{}/success?session_id={}", base, SESSION_ID_PLACEHOLDER),
            cancel_url: format!("{}/", base),
            sync_payment_status: self.sync_payment_status,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    pub(crate) fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, config::ConfigError> {
        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.billing.meter_event_name, "api_requests");
        assert!(!config.billing.sync_payment_status);
        assert_eq!(config.keys.key_bytes, 16);
    }

    #[test]
    fn test_partial_billing_section_keeps_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{"billing": {"price_id": "price_1", "sync_payment_status": true}}"#,
        )
        .unwrap();

        assert_eq!(config.billing.price_id, "price_1");
        assert!(config.billing.sync_payment_status);
        assert_eq!(config.billing.api_base, "https://api.stripe.com");
        assert_eq!(config.billing.usage_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_malformed_value_is_an_error() {
        let builder = config::Config::builder()
            .set_override("keys.key_bytes", "lots")
            .unwrap();

        assert!(AppConfig::from_builder(builder).is_err());
    }

    #[test]
    fn test_override_reaches_keys_section() {
        let builder = config::Config::builder()
            .set_override("keys.key_bytes", 32)
            .unwrap();

        let config = AppConfig::from_builder(builder).unwrap();
        assert_eq!(config.keys.key_bytes, 32);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_purchase_settings_urls() {
        let billing = BillingConfig {
            public_base_url: "https://billing.example.com/".to_string(),
            price_id: "price_1".to_string(),
            ..BillingConfig::default()
        };

        let settings = billing.purchase_settings();

        assert_eq!(
            settings.success_url,
            "https://billing.example.com/success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(settings.cancel_url, "https://billing.example.com/");
        assert_eq!(settings.price_id, "price_1");
    }

    #[test]
    fn test_empty_meter_name_selects_subscription_items() {
        let billing = BillingConfig {
            meter_event_name: "  ".to_string(),
            ..BillingConfig::default()
        };

        assert!(billing.stripe_client_config().meter_event_name.is_none());
        assert_eq!(
            BillingConfig::default().stripe_client_config().meter_event_name.as_deref(),
            Some("api_requests")
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let billing = BillingConfig {
            secret_key: "sk_test_secret".to_string(),
            webhook_secret: "whsec_secret".to_string(),
            ..BillingConfig::default()
        };

        let debug = format!("{:?}", billing);
        assert!(!debug.contains("sk_test_secret"));
        assert!(!debug.contains("whsec_secret"));
    }
}
