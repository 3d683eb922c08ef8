//! Enforcement pipeline: resolve, then authorize, then run the operation.
//!
//! This is the transport-agnostic composition for non-HTTP callers. The HTTP
//! layer applies the same two steps as stacked middleware; both paths share
//! [`CredentialResolver::resolve`] and [`authorize`], so denial handling and
//! logging live in one place.

use thiserror::Error;

use crate::{
    AuthError, AuthenticatedPrincipal, AuthzError, CredentialResolver, IdentityStore,
    PermissionCode, authorize,
};

/// Terminal rejection from the pipeline. The wrapped operation never ran.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnforceError {
    #[error(transparent)]
    Authentication(#[from] AuthError),

    #[error(transparent)]
    Authorization(#[from] AuthzError),
}

/// Run `operation` behind the gate.
///
/// Authentication always runs first. With `required == None` the operation
/// only needs an authenticated principal; otherwise the principal must also
/// hold `required`. The operation's result is returned unchanged.
pub fn enforce<S, T, F>(
    resolver: &CredentialResolver<S>,
    credential: Option<&str>,
    required: Option<&PermissionCode>,
    operation: F,
) -> Result<T, EnforceError>
where
    S: IdentityStore,
    F: FnOnce(&AuthenticatedPrincipal) -> T,
{
    let principal = resolver.resolve(credential)?;

    if let Some(code) = required {
        authorize(&principal, code)?;
    }

    Ok(operation(&principal))
}
