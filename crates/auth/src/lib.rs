//! `keygate-auth` — API-key authentication and role-based authorization.
//!
//! This crate is intentionally decoupled from HTTP. Storage is reached only
//! through the [`IdentityStore`] trait.

pub mod authorize;
pub mod catalog;
pub mod credential;
pub mod permissions;
pub mod pipeline;
pub mod principal;
pub mod provision;
pub mod resolve;
pub mod roles;
pub mod store;

pub use authorize::{AuthzError, authorize, authorize_request};
pub use credential::{ApiKey, CredentialDigest};
pub use permissions::{Permission, PermissionCode, codes};
pub use pipeline::{EnforceError, enforce};
pub use principal::{AuthenticatedPrincipal, Identity, Principal};
pub use provision::{
    NewPrincipal, NewRole, ProvisionError, ProvisionedPrincipal, ProvisionedRole, Provisioner,
};
pub use resolve::{API_KEY_HEADER, AuthError, CredentialResolver};
pub use roles::Role;
pub use store::{IdentityStore, InMemoryIdentityStore, StoreError};
