//! Webhook signature verification
//!
//! Provider signature header format: `t=<unix seconds>,v1=<hex hmac>`, where
//! the HMAC-SHA256 is computed over `"<t>.<raw body>"` with the endpoint's
//! signing secret. Several `v1` entries may be present during secret rotation.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::domain::DomainError;

type HmacSha256 = Hmac<Sha256>;

/// Default tolerance between the signed timestamp and now
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Verifies webhook payloads against the signing secret
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
    tolerance_secs: i64,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("secret", &"<redacted>")
            .field("tolerance_secs", &self.tolerance_secs)
            .finish()
    }
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    pub fn with_tolerance_secs(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    /// Verify a payload against its signature header using the current time
    pub fn verify(&self, payload: &[u8], header: &str) -> Result<(), DomainError> {
        self.verify_at(payload, header, Utc::now().timestamp())
    }

    /// Verify a payload as of `now` (unix seconds)
    pub fn verify_at(&self, payload: &[u8], header: &str, now: i64) -> Result<(), DomainError> {
        if self.secret.is_empty() {
            return Err(DomainError::configuration("Webhook signing secret is not configured"));
        }

        let parsed = parse_header(header)?;

        if now.abs_diff(parsed.timestamp) > self.tolerance_secs.unsigned_abs() {
            return Err(DomainError::signature("Timestamp outside the tolerance zone"));
        }

        for candidate in &parsed.signatures {
            let Ok(expected) = hex::decode(candidate) else {
                continue;
            };

            let mac = self.mac(parsed.timestamp, payload)?;
            if mac.verify_slice(&expected).is_ok() {
                return Ok(());
            }
        }

        Err(DomainError::signature(
            "No signatures found matching the expected signature for payload",
        ))
    }

    /// Build a signature header for a payload
    ///
    /// Useful for replaying captured events against a local gateway.
    pub fn signature_header(&self, payload: &[u8], timestamp: i64) -> Result<String, DomainError> {
        let mac = self.mac(timestamp, payload)?;
        let signature = hex::encode(mac.finalize().into_bytes());
        Ok(format!("t={},v1={}", timestamp, signature))
    }

    fn mac(&self, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, DomainError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| DomainError::internal(format!("Invalid HMAC key: {}", e)))?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac)
    }
}

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_header(header: &str) -> Result<SignatureHeader, DomainError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };

        match key {
            "t" => {
                timestamp = Some(value.parse::<i64>().map_err(|_| {
                    DomainError::signature("Unable to parse timestamp from signature header")
                })?);
            }
            "v1" => signatures.push(value.to_string()),
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| DomainError::signature("Signature header has no timestamp"))?;

    if signatures.is_empty() {
        return Err(DomainError::signature(
            "Signature header has no signatures with the expected scheme",
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}
