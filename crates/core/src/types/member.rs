//! Resolved identities.

use serde::{Deserialize, Serialize};

use super::{Email, Role, UserId};

/// An authenticated user reference resolved from a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Identity service user id.
    pub id: UserId,
    /// Verified email address.
    pub email: Email,
}

/// An identity together with its resolved role.
///
/// Only constructed once both lookups succeeded, so holding a `Member` means
/// the role is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub identity: Identity,
    pub role: Role,
}

impl Member {
    #[must_use]
    pub const fn new(identity: Identity, role: Role) -> Self {
        Self { identity, role }
    }
}
