//! Identity/session service.
//!
//! The identity service owns sessions. The portal only reads the session
//! cookies on each request, asks the service who they belong to, and writes
//! back any tokens the service rotated while answering.
//!
//! # Session cookies
//!
//! ```text
//! sb-access-token   bearer token sent to the service
//! sb-refresh-token  exchanged for a new pair when the access token expires
//! ```
//!
//! Both are `HttpOnly`, `SameSite=Lax`, `Path=/`, and `Secure` over https.

mod client;
mod error;

use async_trait::async_trait;
use cookie::{Cookie, CookieJar, SameSite};
use secrecy::{ExposeSecret, SecretString};

use rakeback_core::{Email, Identity};

pub use client::IdentityClient;
pub use error::IdentityError;

/// Cookie carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";

/// Cookie carrying the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "sb-refresh-token";

/// Session cookie lifetime in seconds (7 days). The access token inside
/// expires sooner and is refreshed on demand.
const SESSION_COOKIE_MAX_AGE_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Token pair issued by the identity service.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
}

/// Result of resolving the caller from their cookies.
#[derive(Debug, Default)]
pub struct SessionResolution {
    /// The caller, if the session is valid.
    pub identity: Option<Identity>,
    /// Cookies to write on the response (rotated or cleared tokens).
    pub set_cookies: Vec<Cookie<'static>>,
}

impl SessionResolution {
    /// No session and nothing to write back.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Valid session, cookies unchanged.
    #[must_use]
    pub fn resolved(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            set_cookies: Vec::new(),
        }
    }
}

/// A fresh session from a password sign-in.
#[derive(Debug)]
pub struct SignedIn {
    pub identity: Identity,
    pub tokens: SessionTokens,
}

/// Operations the portal needs from the identity service.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Resolve the caller from the request cookies.
    ///
    /// An absent, expired, or revoked session is `Ok` with no identity;
    /// `Err` is reserved for the service itself failing.
    async fn resolve_user(&self, cookies: &CookieJar) -> Result<SessionResolution, IdentityError>;

    /// Exchange email and password for a session.
    async fn sign_in(&self, email: &Email, password: &SecretString)
    -> Result<SignedIn, IdentityError>;

    /// Revoke the session held in `cookies`, if any.
    async fn sign_out(&self, cookies: &CookieJar) -> Result<(), IdentityError>;

    /// Check the service is reachable.
    async fn health(&self) -> Result<(), IdentityError>;
}

/// Cookies storing a token pair.
#[must_use]
pub fn session_cookies(tokens: &SessionTokens, secure: bool) -> Vec<Cookie<'static>> {
    vec![
        session_cookie(ACCESS_TOKEN_COOKIE, tokens.access_token.expose_secret(), secure),
        session_cookie(REFRESH_TOKEN_COOKIE, tokens.refresh_token.expose_secret(), secure),
    ]
}

/// Cookies deleting both session tokens from the browser.
#[must_use]
pub fn cleared_session_cookies() -> Vec<Cookie<'static>> {
    [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE]
        .into_iter()
        .map(|name| {
            let mut cookie = Cookie::build((name, "")).path("/").build();
            cookie.make_removal();
            cookie
        })
        .collect()
}

fn session_cookie(name: &'static str, value: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value.to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(cookie::time::Duration::seconds(SESSION_COOKIE_MAX_AGE_SECONDS))
        .build()
}

/// Non-empty cookie value by name.
pub(crate) fn cookie_value<'a>(cookies: &'a CookieJar, name: &str) -> Option<&'a str> {
    cookies
        .get(name)
        .map(Cookie::value)
        .filter(|value| !value.is_empty())
}
