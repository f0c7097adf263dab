//! HTTP middleware stack for the portal.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (record on span and Sentry scope)
//! 4. Security headers
//! 5. Edge gate (referral capture, route authorization)

pub mod auth;
pub mod cookies;
pub mod edge_gate;
pub mod referral;
pub mod request_id;
pub mod security_headers;

pub use auth::{MemberRejection, RequireMember};
pub use cookies::{append_set_cookies, request_cookies};
pub use edge_gate::edge_gate;
pub use referral::{REFERRER_COOKIE, REFERRER_MAX_AGE_SECONDS};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
