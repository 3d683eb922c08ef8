use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use keygate_auth::{AuthError, AuthzError, ProvisionError, StoreError};
use keygate_infra::ProductStoreError;
use keygate_products::ProductError;

/// Coarse error classification shared by every failing response.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    AuthenticationMissing,
    AuthenticationInvalid,
    PermissionDenied,
    ValidationError,
    NotFound,
    MethodNotAllowed,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::AuthenticationMissing | ErrorKind::AuthenticationInvalid => {
                StatusCode::UNAUTHORIZED
            }
            ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
            ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Every error a handler or middleware can turn into a response.
///
/// Rendered as `{"error": "<message>"}` with the status of its [`ErrorKind`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Authentication(#[from] AuthError),

    #[error(transparent)]
    Authorization(#[from] AuthzError),

    #[error("Invalid JSON")]
    InvalidJson,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    MethodNotAllowed(&'static str),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Authentication(AuthError::MissingCredential) => ErrorKind::AuthenticationMissing,
            ApiError::Authentication(AuthError::InvalidCredential) => ErrorKind::AuthenticationInvalid,
            ApiError::Authentication(AuthError::Store(_)) => ErrorKind::Internal,
            ApiError::Authorization(AuthzError::Unauthenticated) => ErrorKind::AuthenticationMissing,
            ApiError::Authorization(AuthzError::Forbidden(_)) => ErrorKind::PermissionDenied,
            ApiError::InvalidJson | ApiError::Validation(_) => ErrorKind::ValidationError,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::MethodNotAllowed(_) => ErrorKind::MethodNotAllowed,
            ApiError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        if kind == ErrorKind::Internal {
            tracing::error!(error = %self, "request failed");
        }
        (kind.status(), axum::Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ApiError::NotFound(msg),
            // Uniqueness violations surface with the raw message.
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ProvisionError> for ApiError {
    fn from(err: ProvisionError) -> Self {
        match err {
            ProvisionError::Validation(msg) => ApiError::Validation(msg),
            ProvisionError::Store(e) => e.into(),
        }
    }
}

impl From<ProductError> for ApiError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::Validation(msg) => ApiError::Validation(msg),
        }
    }
}

impl From<ProductStoreError> for ApiError {
    fn from(err: ProductStoreError) -> Self {
        match err {
            ProductStoreError::NotFound(id) => {
                ApiError::NotFound(format!("Product with id {id} not found"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}
