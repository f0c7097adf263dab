//! External user identifier.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when a user id is not a valid UUID.
#[derive(thiserror::Error, Debug, Clone)]
#[error("invalid user id: {0}")]
pub struct UserIdError(String);

/// Unique user id issued by the external identity service.
///
/// The identity service keys users by UUID; the profile store uses the same
/// value as its primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing UUID.
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse a user id from its hyphenated string form.
    ///
    /// # Errors
    ///
    /// Returns `UserIdError` if the input is not a UUID.
    pub fn parse(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| UserIdError(s.to_owned()))
    }

    /// Get the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for UserId {
    type Err = UserIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}
