//! Core types for the rakeback portal.
//!
//! This module provides type-safe wrappers for the identity and role concepts
//! the gates pass around.

pub mod email;
pub mod id;
pub mod member;
pub mod role;

pub use email::{Email, EmailError};
pub use id::{UserId, UserIdError};
pub use member::{Identity, Member};
pub use role::{Role, RoleParseError};
