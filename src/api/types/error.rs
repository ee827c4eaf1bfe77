//! JSON error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::DomainError;

/// Error categories exposed to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    PermissionError,
    NotFoundError,
    ConflictError,
    ServerError,
    ServiceUnavailableError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::PermissionError => write!(f, "permission_error"),
            Self::NotFoundError => write!(f, "not_found_error"),
            Self::ConflictError => write!(f, "conflict_error"),
            Self::ServerError => write!(f, "server_error"),
            Self::ServiceUnavailableError => write!(f, "service_unavailable_error"),
        }
    }
}

/// Error body: `{"error": {"message", "type", "code"}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error_type: ApiErrorType, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type,
                    code: None,
                },
            },
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.response.error.code = Some(code.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::InvalidRequestError, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, ApiErrorType::PermissionError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorType::NotFoundError, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, ApiErrorType::ConflictError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorType::ServerError, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorType::ServiceUnavailableError,
            message,
        )
    }

    pub fn missing_api_key() -> Self {
        Self::bad_request(
            "API key required. Provide via 'Authorization: Bearer <key>', 'X-API-Key' or the 'apiKey' query parameter",
        )
        .with_code("missing_api_key")
    }

    pub fn unknown_api_key() -> Self {
        Self::forbidden("API key is not recognized").with_code("unknown_api_key")
    }

    pub fn inactive_account() -> Self {
        Self::forbidden("Account is not active").with_code("inactive_account")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::InvalidInput { message } | DomainError::Validation { message } => {
                Self::bad_request(message)
            }
            DomainError::DuplicateAccount { .. } => {
                Self::conflict(err.to_string()).with_code("key_already_issued")
            }
            DomainError::DuplicateFingerprint { .. } => {
                Self::conflict("Key binding conflict").with_code("duplicate_fingerprint")
            }
            DomainError::Provider { provider, message } => {
                Self::unavailable(format!("{}: {}", provider, message)).with_code("provider_error")
            }
            DomainError::Signature { message } => {
                Self::bad_request(message).with_code("invalid_signature")
            }
            DomainError::Configuration { .. }
            | DomainError::Internal { .. }
            | DomainError::Storage { .. } => {
                error!(error = %err, "Request failed");
                Self::internal("Internal server error")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.error_type, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_creation() {
        let err = ApiError::bad_request("session_id is required");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.error_type, ApiErrorType::InvalidRequestError);
        assert_eq!(err.response.error.message, "session_id is required");
        assert!(err.response.error.code.is_none());
    }

    #[test]
    fn test_denials_have_distinct_codes() {
        let codes: Vec<_> = [
            ApiError::missing_api_key(),
            ApiError::unknown_api_key(),
            ApiError::inactive_account(),
        ]
        .into_iter()
        .map(|err| (err.status, err.response.error.code.unwrap()))
        .collect();

        assert_eq!(
            codes,
            vec![
                (StatusCode::BAD_REQUEST, "missing_api_key".to_string()),
                (StatusCode::FORBIDDEN, "unknown_api_key".to_string()),
                (StatusCode::FORBIDDEN, "inactive_account".to_string()),
            ]
        );
    }

    #[test]
    fn test_domain_error_conversion() {
        let cases = [
            (DomainError::not_found("Account not found"), StatusCode::NOT_FOUND),
            (DomainError::invalid_input("empty"), StatusCode::BAD_REQUEST),
            (DomainError::duplicate_account("cus_1"), StatusCode::CONFLICT),
            (DomainError::provider("stripe", "HTTP 500"), StatusCode::SERVICE_UNAVAILABLE),
            (DomainError::signature("no match"), StatusCode::BAD_REQUEST),
            (DomainError::storage("lock poisoned"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (domain_err, status) in cases {
            let api_err: ApiError = domain_err.into();
            assert_eq!(api_err.status, status);
        }
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let api_err: ApiError = DomainError::configuration("secret key missing").into();
        assert_eq!(api_err.response.error.message, "Internal server error");
    }

    #[test]
    fn test_error_serialization() {
        let err = ApiError::unknown_api_key();
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(json["error"]["type"], "permission_error");
        assert_eq!(json["error"]["code"], "unknown_api_key");
        assert!(json["error"]["message"].is_string());
    }
}
