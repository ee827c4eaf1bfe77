//! Request/response logging middleware with key redaction

use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{Request, Uri},
    middleware::Next,
    response::Response,
};
use tracing::info;

/// Query parameters whose values never reach the logs
const SENSITIVE_QUERY_PARAMS: &[&str] = &["apiKey", "api_key", "key"];

/// Middleware to log HTTP requests and responses.
/// `TraceLayer` owns the request span; this only emits events inside it.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = extract_path(&request);
    let query = redact_query(request.uri());
    let request_id = extract_request_id(&request);

    info!(
        method = %method,
        path = %path,
        query = %query,
        request_id = %request_id,
        "Incoming request"
    );

    let response = next.run(request).await;

    info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        request_id = %request_id,
        "Request completed"
    );

    response
}

fn extract_path(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

/// Set by `SetRequestIdLayer` ahead of this middleware
fn extract_request_id(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string()
}

/// Query string with sensitive values replaced
fn redact_query(uri: &Uri) -> String {
    let Some(query) = uri.query() else {
        return String::new();
    };

    query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if SENSITIVE_QUERY_PARAMS.contains(&name) => {
                format!("{}=[REDACTED]", name)
            }
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_query_hides_keys() {
        let uri: Uri = "/api?apiKey=9f2c1e&page=2".parse().unwrap();
        assert_eq!(redact_query(&uri), "apiKey=[REDACTED]&page=2");
    }

    #[test]
    fn test_redact_query_keeps_session_id() {
        let uri: Uri = "/success?session_id=cs_test_1".parse().unwrap();
        assert_eq!(redact_query(&uri), "session_id=cs_test_1");
    }

    #[test]
    fn test_redact_query_without_query() {
        let uri: Uri = "/health".parse().unwrap();
        assert_eq!(redact_query(&uri), "");
    }

    #[test]
    fn test_request_id_fallback() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        assert_eq!(extract_request_id(&request), "-");
    }
}
