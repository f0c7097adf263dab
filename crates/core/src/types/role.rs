//! Portal roles.

use serde::{Deserialize, Serialize};

/// Error returned when a `user_type` value is not a known role.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid role: {0}")]
pub struct RoleParseError(pub String);

/// Authorization tier of an identity.
///
/// Stored in the profile record's `user_type` column. The set is closed: a
/// profile without a recognisable role is an error, never a third role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Content and platform administration.
    Admin,
    /// A player viewing deals and earnings.
    Player,
}

impl Role {
    /// All roles, in route-table order.
    pub const ALL: [Self; 2] = [Self::Admin, Self::Player];

    /// The `user_type` string for this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Player => "player",
        }
    }

    /// Path prefix of the area this role owns.
    #[must_use]
    pub const fn area_prefix(self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::Player => "/player",
        }
    }

    /// Landing page for this role after sign-in or a wrong-role redirect.
    #[must_use]
    pub const fn dashboard_path(self) -> &'static str {
        match self {
            Self::Admin => "/admin/dashboard",
            Self::Player => "/player/dashboard",
        }
    }

    /// Login page for this role's area.
    #[must_use]
    pub const fn login_path(self) -> &'static str {
        match self {
            Self::Admin => "/admin/login",
            Self::Player => "/login",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "player" => Ok(Self::Player),
            _ => Err(RoleParseError(s.to_owned())),
        }
    }
}
