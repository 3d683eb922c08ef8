//! Credential resolution: raw request credential -> active principal.

use thiserror::Error;

use crate::{AuthenticatedPrincipal, CredentialDigest, IdentityStore, StoreError};

/// Request header carrying the credential.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Authentication failure.
///
/// `MissingCredential` and `InvalidCredential` are the same kind for control
/// flow (both unauthenticated); they only differ in message. An inactive
/// principal is indistinguishable from an unknown credential.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("API key required")]
    MissingCredential,

    #[error("Invalid API key")]
    InvalidCredential,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolves credentials against an identity store.
#[derive(Debug, Clone)]
pub struct CredentialResolver<S> {
    store: S,
}

impl<S> CredentialResolver<S>
where
    S: IdentityStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Resolve a raw credential.
    ///
    /// Succeeds only for a stored, active principal. The principal's role (if
    /// it still exists) is read in the same call, so the returned snapshot
    /// reflects the role's permissions as of this request.
    pub fn resolve(&self, raw: Option<&str>) -> Result<AuthenticatedPrincipal, AuthError> {
        let raw = match raw {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Err(AuthError::MissingCredential),
        };

        let principal = self
            .store
            .principal_by_credential(&CredentialDigest::of(raw))?
            .filter(|p| p.active)
            .ok_or(AuthError::InvalidCredential)?;

        let role = match principal.role_id {
            Some(role_id) => self.store.role(role_id)?,
            None => None,
        };

        tracing::debug!(principal_id = %principal.id, "credential resolved");
        Ok(AuthenticatedPrincipal::new(principal, role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ApiKey, Identity, InMemoryIdentityStore, Permission, Principal, Role, codes};

    fn seeded() -> (InMemoryIdentityStore, Role) {
        let store = InMemoryIdentityStore::new();
        store
            .insert_permission(Permission::new(codes::VIEW_PRODUCTS, "View products", ""))
            .unwrap();
        let role = Role::new("User", "");
        store.insert_role(role.clone()).unwrap();
        store.grant_permission(role.id, &codes::VIEW_PRODUCTS).unwrap();
        (store, role)
    }

    fn add_principal(store: &InMemoryIdentityStore, name: &str, role: Option<&Role>) -> (Principal, ApiKey) {
        let key = ApiKey::generate();
        let principal = Principal::new(
            Identity {
                username: name.to_string(),
                email: None,
            },
            role.map(|r| r.id),
            key.digest(),
        );
        store.insert_principal(principal.clone()).unwrap();
        (principal, key)
    }

    #[test]
    fn missing_and_empty_credentials_are_missing() {
        let (store, _) = seeded();
        let resolver = CredentialResolver::new(store);
        assert_eq!(resolver.resolve(None), Err(AuthError::MissingCredential));
        assert_eq!(resolver.resolve(Some("")), Err(AuthError::MissingCredential));
    }

    #[test]
    fn unknown_credential_is_invalid() {
        let (store, _) = seeded();
        let resolver = CredentialResolver::new(store);
        assert_eq!(resolver.resolve(Some("abc")), Err(AuthError::InvalidCredential));
    }

    #[test]
    fn active_principal_resolves_with_role_snapshot() {
        let (store, role) = seeded();
        let (principal, key) = add_principal(&store, "alice", Some(&role));
        let resolver = CredentialResolver::new(store);

        let resolved = resolver.resolve(Some(key.expose())).unwrap();
        assert_eq!(resolved.principal_id(), principal.id);
        assert_eq!(resolved.username(), "alice");
        assert_eq!(resolved.role_name(), Some("User"));
        assert!(resolved.has_permission(&codes::VIEW_PRODUCTS));
    }

    #[test]
    fn inactive_principal_fails_like_unknown_credential() {
        let (store, role) = seeded();
        let (principal, key) = add_principal(&store, "alice", Some(&role));
        store.set_active(principal.id, false).unwrap();
        let resolver = CredentialResolver::new(store);

        assert_eq!(
            resolver.resolve(Some(key.expose())),
            resolver.resolve(Some("never-issued"))
        );
        assert_eq!(resolver.resolve(Some(key.expose())), Err(AuthError::InvalidCredential));
    }

    #[test]
    fn reactivated_principal_resolves_again() {
        let (store, _) = seeded();
        let (principal, key) = add_principal(&store, "alice", None);
        store.set_active(principal.id, false).unwrap();
        store.set_active(principal.id, true).unwrap();
        let resolver = CredentialResolver::new(store);

        let resolved = resolver.resolve(Some(key.expose())).unwrap();
        assert_eq!(resolved.role(), None);
    }

    #[test]
    fn dangling_role_reference_reads_as_no_role() {
        let (store, _) = seeded();
        let key = ApiKey::generate();
        let principal = Principal::new(
            Identity {
                username: "ghost".to_string(),
                email: None,
            },
            Some(keygate_core::RoleId::new()),
            key.digest(),
        );
        store.insert_principal(principal).unwrap();
        let resolver = CredentialResolver::new(store);

        let resolved = resolver.resolve(Some(key.expose())).unwrap();
        assert_eq!(resolved.role_name(), None);
        assert!(!resolved.has_permission(&codes::VIEW_PRODUCTS));
    }
}
