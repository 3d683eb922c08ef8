use std::collections::HashSet;

use chrono::{DateTime, Utc};

use keygate_core::RoleId;

use crate::PermissionCode;

/// A named set of permission codes.
///
/// Membership is a plain set lookup; the set is the materialized view of the
/// role↔permission association at the time the role was read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub description: String,
    permissions: HashSet<PermissionCode>,
    pub created_at: DateTime<Utc>,
}

impl Role {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: RoleId::new(),
            name: name.into(),
            description: description.into(),
            permissions: HashSet::new(),
            created_at: Utc::now(),
        }
    }

    pub fn grants(&self, code: &PermissionCode) -> bool {
        self.permissions.contains(code)
    }

    /// Add a code to the set. Returns `false` if it was already present.
    pub fn grant(&mut self, code: PermissionCode) -> bool {
        self.permissions.insert(code)
    }

    /// Codes in a stable (sorted) order, for display.
    pub fn codes(&self) -> Vec<&PermissionCode> {
        let mut codes: Vec<&PermissionCode> = self.permissions.iter().collect();
        codes.sort();
        codes
    }

    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}
