//! Login and logout.
//!
//! Both login forms post email and password to the identity service. On
//! success the session cookies are set and the member lands on the dashboard
//! of their actual role, whichever form they used.

use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::instrument;

use rakeback_core::Email;
use rakeback_core::routes::{ADMIN_LOGIN_PATH, LOGIN_PATH};

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{append_set_cookies, request_cookies};
use crate::services::IdentityError;
use crate::services::identity::{cleared_session_cookies, session_cookies};
use crate::services::session::{bounded, resolve_role};
use crate::state::AppState;

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Handle the player login form.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    sign_in(&state, form, LOGIN_PATH).await
}

/// Handle the admin login form.
pub async fn admin_login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    sign_in(&state, form, ADMIN_LOGIN_PATH).await
}

#[instrument(skip(state, form))]
async fn sign_in(
    state: &AppState,
    form: LoginForm,
    login_path: &'static str,
) -> Result<Response, AppError> {
    let Ok(email) = Email::parse(&form.email) else {
        return Ok(back_to(login_path, "invalid_credentials"));
    };

    let password = SecretString::from(form.password);
    let limit = state.config().auth_timeout;
    let signed_in = match bounded(limit, state.identity().sign_in(&email, &password)).await {
        Some(Ok(signed_in)) => signed_in,
        Some(Err(IdentityError::InvalidCredentials)) => {
            tracing::info!("Login rejected");
            return Ok(back_to(login_path, "invalid_credentials"));
        }
        Some(Err(e)) => return Err(e.into()),
        None => return Err(AppError::IdentityTimeout(limit)),
    };

    let user_id = signed_in.identity.id;
    let Some(member) = resolve_role(state, limit, signed_in.identity).await else {
        return Ok(back_to(login_path, "no_role"));
    };

    set_sentry_user(&user_id, Some(member.identity.email.as_str()));
    tracing::info!(user_id = %user_id, role = %member.role, "Member signed in");

    let mut response = Redirect::to(member.role.dashboard_path()).into_response();
    append_set_cookies(
        response.headers_mut(),
        &session_cookies(&signed_in.tokens, state.config().secure_cookies()),
    );
    Ok(response)
}

/// Handle logout.
///
/// Revoking the session upstream is best effort and bounded by the auth
/// timeout; the browser's cookies are cleared either way.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = request_cookies(&headers);
    let limit = state.config().auth_timeout;
    match bounded(limit, state.identity().sign_out(&cookies)).await {
        Some(Ok(())) => {}
        Some(Err(e)) => tracing::warn!(error = %e, "Session revocation failed"),
        None => tracing::warn!(timeout_ms = limit.as_millis(), "Session revocation timed out"),
    }
    clear_sentry_user();

    let mut response = Redirect::to("/").into_response();
    append_set_cookies(response.headers_mut(), &cleared_session_cookies());
    response
}

fn back_to(login_path: &str, error: &str) -> Response {
    Redirect::to(&format!("{login_path}?error={error}")).into_response()
}
