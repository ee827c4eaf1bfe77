//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use regex::Regex;

use super::config::MetricsConfig;

/// Prometheus metrics handle for serving the exposition endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the global Prometheus recorder
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("billing_gateway_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);

            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// Record one call to the billing provider
pub fn record_provider_call(provider: &str, operation: &str, success: bool, duration: Duration) {
    let labels = [
        ("provider", provider.to_string()),
        ("operation", operation.to_string()),
        ("status", if success { "success" } else { "error" }.to_string()),
    ];

    counter!("billing_provider_requests_total", &labels).increment(1);
    histogram!("billing_provider_request_duration_seconds", &labels)
        .record(duration.as_secs_f64());
}

static UUID_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
        .expect("valid uuid pattern")
});

static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/\d+(/|$)").expect("valid numeric pattern")
});

// Provider object ids such as cus_, cs_test_ or si_ prefixed tokens
static PROVIDER_ID_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/[a-z]+_(?:[a-z]+_)?[A-Za-z0-9]{8,}(/|$)")
        .expect("valid provider id pattern")
});

/// Sanitize a URL path for metric labels (remove ids, limit cardinality)
fn sanitize_path(path: &str) -> String {
    let path = UUID_SEGMENT.replace_all(path, "{id}");
    let path = NUMERIC_SEGMENT.replace_all(&path, "/{id}$1");
    let path = PROVIDER_ID_SEGMENT.replace_all(&path, "/{id}$1");

    path.chars().take(50).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path_uuid() {
        let sanitized = sanitize_path("/accounts/550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(sanitized, "/accounts/{id}");
    }

    #[test]
    fn test_sanitize_path_numeric_id() {
        assert_eq!(sanitize_path("/accounts/123/usage"), "/accounts/{id}/usage");
    }

    #[test]
    fn test_sanitize_path_provider_id() {
        assert_eq!(
            sanitize_path("/customers/cus_NffrFeUfNV2Hib"),
            "/customers/{id}"
        );
        assert_eq!(
            sanitize_path("/sessions/cs_test_a1b2c3d4e5f6/lines"),
            "/sessions/{id}/lines"
        );
    }

    #[test]
    fn test_sanitize_path_keeps_static_routes() {
        assert_eq!(sanitize_path("/health"), "/health");
        assert_eq!(sanitize_path("/checkout"), "/checkout");
        assert_eq!(sanitize_path("/success"), "/success");
    }

    #[test]
    fn test_sanitize_path_truncates_long_paths() {
        let path = "/very/long/path/that/exceeds/the/maximum/allowed/length/for/metrics";
        assert!(sanitize_path(path).len() <= 50);
    }
}
