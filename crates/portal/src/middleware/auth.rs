//! Extractor for the member resolved by the edge gate.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};

use rakeback_core::Member;
use rakeback_core::routes::{LOGIN_PATH, RouteClass, classify};

/// Extractor that requires a member placed in the request by the edge gate.
///
/// Handlers on protected paths use this to read the caller. If the gate did
/// not run, or let the request through without a member, the request is
/// rejected instead of served anonymously.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(RequireMember(member): RequireMember) -> impl IntoResponse {
///     format!("Hello, {}!", member.identity.email)
/// }
/// ```
pub struct RequireMember(pub Member);

/// Rejection when no member is present.
#[derive(Debug, PartialEq, Eq)]
pub enum MemberRejection {
    /// Redirect to a login page (for HTML requests).
    RedirectToLogin(&'static str),
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for MemberRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(path) => Redirect::to(path).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireMember
where
    S: Send + Sync,
{
    type Rejection = MemberRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(member) = parts.extensions.get::<Member>() {
            return Ok(Self(member.clone()));
        }

        let path = parts.uri.path();
        if path.starts_with("/api/") {
            return Err(MemberRejection::Unauthorized);
        }

        let login = match classify(path) {
            RouteClass::Protected(role) => role.login_path(),
            RouteClass::Public => LOGIN_PATH,
        };
        Err(MemberRejection::RedirectToLogin(login))
    }
}
