//! JSON API.

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};

use rakeback_core::AuthState;

use crate::middleware::{append_set_cookies, request_cookies};
use crate::services::lookup_member;
use crate::state::AppState;

/// Current auth state for the browser-side provider.
///
/// ```json
/// { "isLoggedIn": true, "isLoading": false, "role": "player" }
/// ```
///
/// Resolution failures read as signed out, as at the edge gate.
pub async fn auth_state(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let lookup = lookup_member(&state, &request_cookies(&headers)).await;
    let body = lookup
        .member
        .map_or(AuthState::SIGNED_OUT, |member| AuthState::signed_in(member.role));

    let mut response = Json(body).into_response();
    append_set_cookies(response.headers_mut(), &lookup.set_cookies);
    response
}
