use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use keygate_core::PermissionId;

/// Permission code checked at enforcement time (e.g. "view_products").
///
/// Codes are stable technical identifiers. Display names live on
/// [`Permission`] and never take part in a decision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionCode(Cow<'static, str>);

impl PermissionCode {
    pub fn new(code: impl Into<Cow<'static, str>>) -> Self {
        Self(code.into())
    }

    pub const fn from_static(code: &'static str) -> Self {
        Self(Cow::Borrowed(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PermissionCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Codes the shipped operations are gated on.
pub mod codes {
    use super::PermissionCode;

    pub const VIEW_PRODUCTS: PermissionCode = PermissionCode::from_static("view_products");
    pub const CREATE_PRODUCTS: PermissionCode = PermissionCode::from_static("create_products");
    pub const UPDATE_PRODUCTS: PermissionCode = PermissionCode::from_static("update_products");
    pub const DELETE_PRODUCTS: PermissionCode = PermissionCode::from_static("delete_products");
    pub const CREATE_USER: PermissionCode = PermissionCode::from_static("create_user");
    pub const ADMIN_USERS: PermissionCode = PermissionCode::from_static("admin_users");
    pub const ADMIN_ROLES: PermissionCode = PermissionCode::from_static("admin_roles");
}

/// A permission record as stored in the identity store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub id: PermissionId,
    pub code: PermissionCode,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Permission {
    pub fn new(code: PermissionCode, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: PermissionId::new(),
            code,
            name: name.into(),
            description: description.into(),
            created_at: Utc::now(),
        }
    }
}
