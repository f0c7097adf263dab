//! Rakeback portal library.
//!
//! This crate provides the portal web application as a library so the
//! router can be driven by tests without a live identity service.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::{edge_gate, request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Build the portal router with its middleware stack.
///
/// Sentry layers are added by the binary, outside this router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service(
            "/static",
            ServeDir::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
        )
        .layer(from_fn_with_state(state.clone(), edge_gate))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id = tracing::field::Empty,
                user_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the identity service is not reachable
/// within the auth timeout.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match tokio::time::timeout(state.config().auth_timeout, state.identity().health()).await {
        Ok(Ok(())) => StatusCode::OK,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Identity service not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
        Err(_) => {
            tracing::warn!("Identity service health check timed out");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{
            HeaderValue,
            header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        },
        response::Response,
    };
    use cookie::Cookie;
    use tower::ServiceExt;

    use rakeback_core::{AuthState, Role};

    use super::*;
    use crate::middleware::request_id::REQUEST_ID_HEADER;
    use crate::services::identity::ACCESS_TOKEN_COOKIE;
    use crate::testing::{FakeIdentity, FakeRoles, identity, test_config};

    const PLAYER_EMAIL: &str = "player@rakeback.test";
    const ADMIN_EMAIL: &str = "admin@rakeback.test";
    const PASSWORD: &str = "correct horse battery staple";

    fn portal(identity: FakeIdentity, roles: FakeRoles) -> Router {
        app(AppState::with_services(
            test_config("http://identity.test"),
            Arc::new(identity),
            Arc::new(roles),
        ))
    }

    /// Portal with a player (`player-token`) and an admin (`admin-token`),
    /// both able to sign in with [`PASSWORD`].
    fn populated() -> Router {
        let player = identity(PLAYER_EMAIL);
        let admin = identity(ADMIN_EMAIL);
        let roles = FakeRoles::new()
            .with_role(&player, Role::Player)
            .with_role(&admin, Role::Admin);
        let identities = FakeIdentity::new()
            .with_session("player-token", player.clone())
            .with_session("admin-token", admin.clone())
            .with_password(player, PASSWORD)
            .with_password(admin, PASSWORD);
        portal(identities, roles)
    }

    async fn get(router: &Router, path: &str, cookie: Option<&str>) -> Response {
        let mut request = axum::http::Request::builder()
            .uri(path)
            .body(Body::empty())
            .unwrap();
        if let Some(cookie) = cookie {
            request
                .headers_mut()
                .insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        }
        router.clone().oneshot(request).await.unwrap()
    }

    async fn post_form(router: &Router, path: &str, body: &str) -> Response {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri(path)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_owned()))
            .unwrap();
        router.clone().oneshot(request).await.unwrap()
    }

    fn location(response: &Response) -> Option<&str> {
        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    fn set_cookies(response: &Response) -> Vec<Cookie<'static>> {
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| Cookie::parse(v.to_owned()).ok())
            .collect()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn login_body(email: &str) -> String {
        format!("email={}&password={}", email, PASSWORD.replace(' ', "+"))
    }

    #[tokio::test]
    async fn test_health() {
        let router = populated();
        let response = get(&router, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_readiness_follows_identity_service() {
        let response = get(&populated(), "/health/ready", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let router = portal(FakeIdentity::new().failing(), FakeRoles::new());
        let response = get(&router, "/health/ready", None).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_home_is_public() {
        let response = get(&populated(), "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        assert!(response.headers().contains_key("x-frame-options"));
    }

    #[tokio::test]
    async fn test_admin_session_sees_admin_dashboard() {
        let response = get(
            &populated(),
            "/admin/dashboard",
            Some("sb-access-token=admin-token"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Admin dashboard"));
        assert!(body.contains(ADMIN_EMAIL));
    }

    #[tokio::test]
    async fn test_no_session_player_dashboard_redirects_to_login() {
        let response = get(&populated(), "/player/dashboard", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/login"));
    }

    #[tokio::test]
    async fn test_player_never_sees_admin_content() {
        let response = get(
            &populated(),
            "/admin/dashboard",
            Some("sb-access-token=player-token"),
        )
        .await;
        assert_eq!(location(&response), Some("/player/dashboard"));
        assert!(!body_text(response).await.contains("Admin dashboard"));
    }

    #[tokio::test]
    async fn test_login_sets_session_and_lands_on_dashboard() {
        let response = post_form(&populated(), "/login", &login_body(PLAYER_EMAIL)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/player/dashboard"));
        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().all(|c| c.http_only() == Some(true)));
    }

    #[tokio::test]
    async fn test_admin_form_lands_on_actual_role_dashboard() {
        let router = populated();

        let response = post_form(&router, "/admin/login", &login_body(ADMIN_EMAIL)).await;
        assert_eq!(location(&response), Some("/admin/dashboard"));

        let response = post_form(&router, "/admin/login", &login_body(PLAYER_EMAIL)).await;
        assert_eq!(location(&response), Some("/player/dashboard"));
    }

    #[tokio::test]
    async fn test_wrong_password_returns_to_same_login() {
        let router = populated();

        let response = post_form(
            &router,
            "/admin/login",
            &format!("email={ADMIN_EMAIL}&password=nope"),
        )
        .await;
        assert_eq!(
            location(&response),
            Some("/admin/login?error=invalid_credentials")
        );
        assert!(set_cookies(&response).is_empty());

        let response = post_form(&router, "/login", "email=not-an-email&password=x").await;
        assert_eq!(location(&response), Some("/login?error=invalid_credentials"));
    }

    #[tokio::test]
    async fn test_login_without_role_sets_no_session() {
        let user = identity("norole@rakeback.test");
        let router = portal(
            FakeIdentity::new().with_password(user, PASSWORD),
            FakeRoles::new(),
        );
        let response = post_form(&router, "/login", &login_body("norole@rakeback.test")).await;
        assert_eq!(location(&response), Some("/login?error=no_role"));
        assert!(set_cookies(&response).is_empty());
    }

    #[tokio::test]
    async fn test_login_service_failure_is_bad_gateway() {
        let router = portal(FakeIdentity::new().failing(), FakeRoles::new());
        let response = post_form(&router, "/login", &login_body(PLAYER_EMAIL)).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_login_hanging_identity_service_times_out() {
        let router = portal(FakeIdentity::new().hanging(), FakeRoles::new());
        let response = post_form(&router, "/login", &login_body(PLAYER_EMAIL)).await;
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert!(set_cookies(&response).is_empty());
    }

    #[tokio::test]
    async fn test_logout_with_hanging_identity_service_still_clears_cookies() {
        let router = portal(FakeIdentity::new().hanging(), FakeRoles::new());
        let response = post_form(&router, "/logout", "").await;
        assert_eq!(location(&response), Some("/"));
        assert!(
            set_cookies(&response)
                .iter()
                .any(|c| c.name() == ACCESS_TOKEN_COOKIE && c.value().is_empty())
        );
    }

    #[tokio::test]
    async fn test_login_error_message_rendered() {
        let response = get(&populated(), "/admin/login?error=invalid_credentials", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Invalid email or password."));
        assert!(body.contains("Admin sign in"));
    }

    #[tokio::test]
    async fn test_logout_clears_cookies() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/logout")
            .header(COOKIE, "sb-access-token=player-token")
            .body(Body::empty())
            .unwrap();
        let router = populated();
        let response = router.clone().oneshot(request).await.unwrap();

        assert_eq!(location(&response), Some("/"));
        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().all(|c| c.value().is_empty()));

        // The revoked token no longer opens the dashboard
        let response = get(
            &router,
            "/player/dashboard",
            Some("sb-access-token=player-token"),
        )
        .await;
        assert_eq!(location(&response), Some("/login"));
    }

    #[tokio::test]
    async fn test_auth_state_endpoint() {
        let router = populated();

        let response = get(&router, "/api/auth/state", Some("sb-access-token=admin-token")).await;
        let body = body_text(response).await;
        assert_eq!(
            serde_json::from_str::<AuthState>(&body).unwrap(),
            AuthState::signed_in(Role::Admin)
        );
        assert!(body.contains(r#""isLoggedIn":true"#));

        let response = get(&router, "/api/auth/state", None).await;
        let body = body_text(response).await;
        assert_eq!(
            serde_json::from_str::<AuthState>(&body).unwrap(),
            AuthState::SIGNED_OUT
        );
    }

    #[tokio::test]
    async fn test_deals_shows_recorded_referral() {
        let response = get(&populated(), "/deals", Some("referrer_code=AFF42")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("AFF42"));
    }

    #[tokio::test]
    async fn test_login_then_dashboard_with_issued_cookie() {
        let router = populated();
        let response = post_form(&router, "/login", &login_body(PLAYER_EMAIL)).await;
        let access = set_cookies(&response)
            .into_iter()
            .find(|c| c.name() == ACCESS_TOKEN_COOKIE)
            .unwrap();

        let cookie = format!("{}={}", access.name(), access.value());
        let response = get(&router, "/player/dashboard", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(PLAYER_EMAIL));
    }
}
