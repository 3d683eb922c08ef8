use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use keygate_auth::{API_KEY_HEADER, AuthError, CredentialResolver, IdentityStore};

use crate::app::errors::ApiError;

#[derive(Clone)]
pub struct AuthState {
    pub resolver: CredentialResolver<Arc<dyn IdentityStore>>,
}

/// Resolve the request credential and attach the principal to the request.
///
/// Terminal 401 on failure; nothing downstream runs.
pub async fn authenticate(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = extract_api_key(req.headers())
        .and_then(|key| state.resolver.resolve(key))
        .inspect_err(|e| {
            tracing::debug!(error = %e, path = %req.uri().path(), "authentication failed");
        })?;

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// A header that is present but not valid text counts as an invalid key.
fn extract_api_key(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    match headers.get(API_KEY_HEADER) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(|v| Some(v.trim()))
            .map_err(|_| AuthError::InvalidCredential),
    }
}
