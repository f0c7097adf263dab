//! Edge Gate: route authorization before any protected handler runs.
//!
//! Per request, in order:
//!
//! 1. `/deals?ref=...` - referral capture, redirect to `/deals`
//! 2. Public path - pass through, no identity lookup
//! 3. Protected path - resolve session, then role, then compare with the area
//!
//! Lookup failures are never surfaced: a caller whose session or role cannot
//! be resolved is sent to the area's login page. Cookies the identity service
//! rotated are written on every outcome.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::Span;

use rakeback_core::routes::{self, DEALS_PATH, RouteClass};
use rakeback_core::{Member, Viewer};

use super::cookies::{append_set_cookies, request_cookies};
use super::referral;
use crate::error::set_sentry_user;
use crate::services::lookup_member;
use crate::state::AppState;

/// Route authorization middleware.
///
/// On allow, the resolved [`Member`] is inserted into the
/// request extensions for [`super::RequireMember`].
pub async fn edge_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();

    if path == DEALS_PATH
        && let Some(code) = referral::referral_code(request.uri().query())
    {
        let cookies = request_cookies(request.headers());
        return referral::capture(&cookies, &code, state.config().secure_cookies());
    }

    let RouteClass::Protected(required) = routes::classify(&path) else {
        return next.run(request).await;
    };

    let cookies = request_cookies(request.headers());
    let lookup = lookup_member(&state, &cookies).await;
    let viewer = Viewer::from(lookup.member.as_ref().map(|member| member.role));

    let mut response = match routes::check_role(required, viewer).redirect_path() {
        Some(target) => {
            tracing::info!(
                path = %path,
                required = %required,
                viewer = ?viewer,
                redirect = target,
                "Edge gate redirect"
            );
            Redirect::to(target).into_response()
        }
        None => {
            if let Some(member) = lookup.member {
                record_member(&member);
                request.extensions_mut().insert(member);
            }
            next.run(request).await
        }
    };

    append_set_cookies(response.headers_mut(), &lookup.set_cookies);
    response
}

fn record_member(member: &Member) {
    let user_id = &member.identity.id;
    Span::current().record("user_id", tracing::field::display(user_id));
    set_sentry_user(user_id, Some(member.identity.email.as_str()));
    tracing::debug!(user_id = %user_id, role = %member.role, "Edge gate allow");
}
