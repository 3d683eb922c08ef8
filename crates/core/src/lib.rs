//! `keygate-core` — shared identifiers and the domain error model.
//!
//! This crate holds **pure** primitives only (no IO, no HTTP, no storage).

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::{PermissionId, PrincipalId, ProductId, RoleId};
