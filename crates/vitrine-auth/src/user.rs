//! Back-office user types.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use vitrine_core::ids::UserId;
use vitrine_db::AdminUserRecord;

use crate::AuthError;

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Store staff with read-only back-office access.
    Staff,
    /// Store administrator.
    #[default]
    Admin,
}

impl Role {
    /// Get role as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }

    /// Check if this role has at least the given permission level.
    pub fn has_permission(&self, required: Role) -> bool {
        self.level() >= required.level()
    }

    /// Get permission level (higher = more permissions).
    pub fn level(&self) -> u8 {
        match self {
            Role::Staff => 1,
            Role::Admin => 2,
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

/// An authenticated back-office user — the credential-free view handed
/// to the HTTP layer.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdminUser {
    /// User ID.
    pub id: UserId,
    /// Email address.
    pub email: String,
    /// Authorization role.
    pub role: Role,
    /// Unix timestamp of creation.
    pub created_at: i64,
}

impl TryFrom<AdminUserRecord> for AdminUser {
    type Error = AuthError;

    fn try_from(record: AdminUserRecord) -> Result<Self, Self::Error> {
        let role = record
            .role
            .parse()
            .map_err(|_| AuthError::Internal(format!("unknown role '{}'", record.role)))?;
        Ok(Self {
            id: record.id,
            email: record.email,
            role,
            created_at: record.created_at,
        })
    }
}
