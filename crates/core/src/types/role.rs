//! Profile roles.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sentinel value of the profile `role` column granting admin privilege.
pub const ADMIN_ROLE: &str = "admin";

/// Role stored on a user's profile row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileRole {
    Admin,
    Customer,
}

impl ProfileRole {
    /// Whether this role grants admin privilege.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl FromStr for ProfileRole {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            ADMIN_ROLE => Ok(Self::Admin),
            "customer" | "user" => Ok(Self::Customer),
            other => Err(RoleParseError(other.to_owned())),
        }
    }
}

impl fmt::Display for ProfileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => f.write_str(ADMIN_ROLE),
            Self::Customer => f.write_str("customer"),
        }
    }
}

/// The role string did not match any known role.
#[derive(thiserror::Error, Debug, Clone)]
#[error("unknown role: {0}")]
pub struct RoleParseError(pub String);
