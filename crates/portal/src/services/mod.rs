//! External collaborators and the lookups built on them.
//!
//! - [`identity`] - Identity/session service (resolve, sign in, sign out)
//! - [`profiles`] - Profile store holding each user's role
//! - [`session`] - Bounded identity-then-role resolution used by the gate

pub mod identity;
pub mod profiles;
pub mod session;

pub use identity::{IdentityError, IdentityService, SessionResolution};
pub use profiles::{RoleLookupError, RoleStore};
pub use session::{SessionLookup, lookup_member};
