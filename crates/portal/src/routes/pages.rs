//! Server-rendered pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::Query,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use rakeback_core::Role;
use rakeback_core::routes::{ADMIN_LOGIN_PATH, LOGIN_PATH};

use crate::middleware::{REFERRER_COOKIE, RequireMember, request_cookies};

// =============================================================================
// Templates
// =============================================================================

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate;

/// Deals page template.
#[derive(Template, WebTemplate)]
#[template(path = "deals.html")]
pub struct DealsTemplate {
    pub referrer_code: Option<String>,
}

/// Login page template, shared by both login forms.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub title: &'static str,
    pub action: &'static str,
    pub error: Option<&'static str>,
}

/// Dashboard template, shared by both roles.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub title: &'static str,
    pub email: String,
    pub role: Role,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

impl MessageQuery {
    /// User-facing message for a known error code. Unknown codes show nothing.
    fn message(&self) -> Option<&'static str> {
        match self.error.as_deref()? {
            "invalid_credentials" => Some("Invalid email or password."),
            "no_role" => Some("This account has no portal access yet."),
            _ => None,
        }
    }
}

// =============================================================================
// Public Pages
// =============================================================================

/// Display the home page.
pub async fn home() -> impl IntoResponse {
    HomeTemplate
}

/// Display the deals page, noting the recorded referral if any.
pub async fn deals(headers: HeaderMap) -> impl IntoResponse {
    let referrer_code = request_cookies(&headers)
        .get(REFERRER_COOKIE)
        .map(|cookie| cookie.value().to_owned());
    DealsTemplate { referrer_code }
}

/// Display the player login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        title: "Sign in",
        action: LOGIN_PATH,
        error: query.message(),
    }
}

/// Display the admin login page.
pub async fn admin_login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        title: "Admin sign in",
        action: ADMIN_LOGIN_PATH,
        error: query.message(),
    }
}

// =============================================================================
// Dashboards
// =============================================================================

/// Display the admin dashboard.
#[instrument(skip_all)]
pub async fn admin_dashboard(RequireMember(member): RequireMember) -> Response {
    dashboard(Role::Admin, "Admin dashboard", member)
}

/// Display the player dashboard.
#[instrument(skip_all)]
pub async fn player_dashboard(RequireMember(member): RequireMember) -> Response {
    dashboard(Role::Player, "Player dashboard", member)
}

fn dashboard(required: Role, title: &'static str, member: rakeback_core::Member) -> Response {
    // The gate already enforced this; a mismatch means the route was mounted without it
    if member.role != required {
        return Redirect::to(member.role.dashboard_path()).into_response();
    }

    DashboardTemplate {
        title,
        email: member.identity.email.as_str().to_owned(),
        role: member.role,
    }
    .into_response()
}
