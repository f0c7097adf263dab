//! Identity-then-role resolution for one request.
//!
//! Every external call is bounded by the configured auth timeout. A lookup
//! that errors, times out, or finds no role yields no member; callers never
//! see the underlying error. Cookies rotated by the identity service are
//! returned regardless of the outcome so they can be written to the response.

use std::future::Future;
use std::time::Duration;

use cookie::{Cookie, CookieJar};
use tokio::time::timeout;

use rakeback_core::{Identity, Member, Role};

use crate::state::AppState;

/// Outcome of [`lookup_member`].
#[derive(Debug, Default)]
pub struct SessionLookup {
    /// The caller with their role, when both lookups succeeded.
    pub member: Option<Member>,
    /// Cookies the identity service asked us to set.
    pub set_cookies: Vec<Cookie<'static>>,
}

/// Resolve the caller and their role from request cookies.
pub async fn lookup_member(state: &AppState, cookies: &CookieJar) -> SessionLookup {
    let limit = state.config().auth_timeout;

    let resolution = match bounded(limit, state.identity().resolve_user(cookies)).await {
        Some(Ok(resolution)) => resolution,
        Some(Err(e)) => {
            tracing::warn!(error = %e, "Session resolution failed");
            return SessionLookup::default();
        }
        None => {
            tracing::warn!(timeout_ms = limit.as_millis(), "Session resolution timed out");
            return SessionLookup::default();
        }
    };

    let member = match resolution.identity {
        Some(identity) => resolve_role(state, limit, identity).await,
        None => None,
    };

    SessionLookup {
        member,
        set_cookies: resolution.set_cookies,
    }
}

/// Role lookup for a resolved identity.
///
/// A missing or unreadable role is not a role: the caller is treated as
/// signed out rather than sent to a dashboard they may not own.
pub async fn resolve_role(state: &AppState, limit: Duration, identity: Identity) -> Option<Member> {
    let role: Option<Role> = match bounded(limit, state.roles().role_for(&identity.id)).await {
        Some(Ok(Some(role))) => Some(role),
        Some(Ok(None)) => {
            tracing::warn!(user_id = %identity.id, "Profile has no role");
            None
        }
        Some(Err(e)) => {
            tracing::warn!(user_id = %identity.id, error = %e, "Role lookup failed");
            None
        }
        None => {
            tracing::warn!(
                user_id = %identity.id,
                timeout_ms = limit.as_millis(),
                "Role lookup timed out"
            );
            None
        }
    };

    role.map(|role| Member::new(identity, role))
}

/// Await `future` for at most `limit`; `None` on timeout.
pub async fn bounded<F: Future>(limit: Duration, future: F) -> Option<F::Output> {
    timeout(limit, future).await.ok()
}
