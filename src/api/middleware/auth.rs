//! API key extraction and entitlement extractors

use axum::{
    extract::{FromRequestParts, Query},
    http::{header, request::Parts, HeaderMap, Uri},
};
use serde::Deserialize;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::access::AuthDecision;
use crate::domain::account::{Account, AccountId};

/// The plaintext key presented with a request, if any
///
/// Sources, in order of precedence:
/// - Authorization header: `Bearer <api_key>`
/// - X-API-Key header: `<api_key>`
/// - `apiKey` query parameter
///
/// Blank values count as absent.
#[derive(Debug, Clone)]
pub struct PresentedKey(pub Option<String>);

impl<S> FromRequestParts<S> for PresentedKey
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_api_key(&parts.headers, &parts.uri).map(PresentedKey)
    }
}

/// Extractor that requires a key bound to an active account
///
/// Rejects with 400 `missing_api_key`, 403 `unknown_api_key` or
/// 403 `inactive_account`.
#[derive(Debug, Clone)]
pub struct RequireEntitlement {
    pub account_id: AccountId,
    pub subscription_item_id: Option<String>,
}

impl FromRequestParts<AppState> for RequireEntitlement {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let PresentedKey(key) = PresentedKey::from_request_parts(parts, state).await?;

        match state.access_gate.authorize(key.as_deref()).await? {
            AuthDecision::Granted {
                account_id,
                subscription_item_id,
            } => Ok(Self {
                account_id,
                subscription_item_id,
            }),
            AuthDecision::DeniedNoKey => Err(ApiError::missing_api_key()),
            AuthDecision::DeniedUnknownKey => Err(ApiError::unknown_api_key()),
            AuthDecision::DeniedInactive => Err(ApiError::inactive_account()),
        }
    }
}

/// Extractor for the account bound to a key, active or not
///
/// Rejects with 400 when no key is presented and 404 when it is unknown.
#[derive(Debug, Clone)]
pub struct RequireAccount(pub Account);

impl FromRequestParts<AppState> for RequireAccount {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let PresentedKey(key) = PresentedKey::from_request_parts(parts, state).await?;
        let key = key.ok_or_else(ApiError::missing_api_key)?;

        state
            .access_gate
            .resolve(Some(&key))
            .await?
            .map(RequireAccount)
            .ok_or_else(|| {
                ApiError::not_found("No account is bound to this API key")
                    .with_code("unknown_api_key")
            })
    }
}

#[derive(Debug, Deserialize)]
struct KeyQuery {
    #[serde(rename = "apiKey")]
    api_key: Option<String>,
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn extract_api_key(headers: &HeaderMap, uri: &Uri) -> Result<Option<String>, ApiError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| ApiError::bad_request("Invalid Authorization header encoding"))?;

        if let Some(token) = auth_str.strip_prefix("Bearer ").and_then(non_blank) {
            debug!(source = "bearer", "API key presented");
            return Ok(Some(token));
        }
    }

    if let Some(api_key_header) = headers.get("x-api-key") {
        let key = api_key_header
            .to_str()
            .map_err(|_| ApiError::bad_request("Invalid X-API-Key header encoding"))?;

        if let Some(key) = non_blank(key) {
            debug!(source = "x-api-key", "API key presented");
            return Ok(Some(key));
        }
    }

    // A malformed query string carries no key
    let from_query = Query::<KeyQuery>::try_from_uri(uri)
        .ok()
        .and_then(|Query(query)| query.api_key)
        .and_then(|key| non_blank(&key));

    if from_query.is_some() {
        debug!(source = "query", "API key presented");
    }

    Ok(from_query)
}
