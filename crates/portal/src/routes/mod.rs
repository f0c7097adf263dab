//! HTTP route handlers for the portal.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                   - Home page
//! GET  /deals              - Deals page (ref=<code> handled by the edge gate)
//!
//! # Auth
//! GET  /login              - Player login page
//! POST /login              - Player login action
//! GET  /admin/login        - Admin login page
//! POST /admin/login        - Admin login action
//! POST /logout             - Logout action
//! GET  /api/auth/state     - Auth state for the browser-side provider
//!
//! # Dashboards (behind the edge gate)
//! GET  /admin/dashboard    - Admin dashboard
//! GET  /player/dashboard   - Player dashboard
//! ```

pub mod api;
pub mod auth;
pub mod pages;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(pages::login_page).post(auth::login))
        .route(
            "/admin/login",
            get(pages::admin_login_page).post(auth::admin_login),
        )
        .route("/logout", post(auth::logout))
        .route("/api/auth/state", get(api::auth_state))
}

/// Create the dashboard routes router.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/dashboard", get(pages::admin_dashboard))
        .route("/player/dashboard", get(pages::player_dashboard))
}

/// Create all routes for the portal.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/deals", get(pages::deals))
        .merge(auth_routes())
        .merge(dashboard_routes())
}
