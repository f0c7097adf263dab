//! HTTP client for the hosted identity service.
//!
//! Endpoints (relative to the configured base URL):
//!
//! ```text
//! GET  auth/v1/user                            - user for a bearer access token
//! POST auth/v1/token?grant_type=refresh_token  - rotate a token pair
//! POST auth/v1/token?grant_type=password       - email/password sign-in
//! POST auth/v1/logout                          - revoke a session
//! GET  auth/v1/health                          - liveness
//! ```
//!
//! Every request carries the public key in the `apikey` header.

use async_trait::async_trait;
use cookie::CookieJar;
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use url::Url;

use rakeback_core::{Email, Identity, UserId};

use super::{
    ACCESS_TOKEN_COOKIE, IdentityError, IdentityService, REFRESH_TOKEN_COOKIE,
    SessionResolution, SessionTokens, SignedIn, cleared_session_cookies, cookie_value,
    session_cookies,
};
use crate::config::IdentityServiceConfig;

/// User object returned by the identity service.
#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    email: Option<String>,
}

impl UserPayload {
    fn into_identity(self) -> Result<Identity, IdentityError> {
        let id = UserId::parse(&self.id).map_err(|e| IdentityError::MalformedUser(e.to_string()))?;
        let email = self
            .email
            .as_deref()
            .ok_or_else(|| IdentityError::MalformedUser(format!("user {id} has no email")))
            .and_then(|raw| {
                Email::parse(raw).map_err(|e| IdentityError::MalformedUser(e.to_string()))
            })?;
        Ok(Identity { id, email })
    }
}

/// Token grant response.
#[derive(Deserialize)]
struct TokenGrant {
    access_token: String,
    refresh_token: String,
    user: UserPayload,
}

impl TokenGrant {
    fn into_signed_in(self) -> Result<SignedIn, IdentityError> {
        Ok(SignedIn {
            identity: self.user.into_identity()?,
            tokens: SessionTokens {
                access_token: SecretString::from(self.access_token),
                refresh_token: SecretString::from(self.refresh_token),
            },
        })
    }
}

/// Identity service client.
///
/// Cheap to clone; shares the underlying connection pool.
#[derive(Clone)]
pub struct IdentityClient {
    http: Client,
    base_url: Url,
    api_key: SecretString,
    secure_cookies: bool,
}

impl IdentityClient {
    /// Create a client.
    ///
    /// # Arguments
    ///
    /// * `http` - Shared HTTP client
    /// * `config` - Service URL and public key
    /// * `secure_cookies` - Whether rotated session cookies get `Secure`
    #[must_use]
    pub fn new(http: Client, config: &IdentityServiceConfig, secure_cookies: bool) -> Self {
        Self {
            http,
            base_url: config.url.clone(),
            api_key: config.public_key.clone(),
            secure_cookies,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, IdentityError> {
        Ok(self.base_url.join(path)?)
    }

    fn token_endpoint(&self, grant_type: &str) -> Result<Url, IdentityError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);
        Ok(url)
    }

    fn with_key(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("apikey", self.api_key.expose_secret())
    }

    /// Look up the user behind an access token. `None` if the token is rejected.
    async fn fetch_user(&self, access_token: &str) -> Result<Option<Identity>, IdentityError> {
        let response = self
            .with_key(self.http.get(self.endpoint("auth/v1/user")?))
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let user: UserPayload = response.json().await?;
                user.into_identity().map(Some)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status => Err(IdentityError::UnexpectedStatus(status)),
        }
    }

    /// Rotate a refresh token. `None` if the refresh token is no longer valid.
    async fn refresh(&self, refresh_token: &str) -> Result<Option<SignedIn>, IdentityError> {
        let response = self
            .with_key(self.http.post(self.token_endpoint("refresh_token")?))
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let grant: TokenGrant = response.json().await?;
                grant.into_signed_in().map(Some)
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status => Err(IdentityError::UnexpectedStatus(status)),
        }
    }
}

#[async_trait]
impl IdentityService for IdentityClient {
    #[instrument(skip_all)]
    async fn resolve_user(&self, cookies: &CookieJar) -> Result<SessionResolution, IdentityError> {
        if let Some(access_token) = cookie_value(cookies, ACCESS_TOKEN_COOKIE)
            && let Some(identity) = self.fetch_user(access_token).await?
        {
            return Ok(SessionResolution::resolved(identity));
        }

        let Some(refresh_token) = cookie_value(cookies, REFRESH_TOKEN_COOKIE) else {
            return Ok(SessionResolution::anonymous());
        };

        match self.refresh(refresh_token).await? {
            Some(SignedIn { identity, tokens }) => {
                tracing::debug!(user_id = %identity.id, "Session refreshed");
                Ok(SessionResolution {
                    identity: Some(identity),
                    set_cookies: session_cookies(&tokens, self.secure_cookies),
                })
            }
            None => {
                tracing::debug!("Refresh token rejected, clearing session cookies");
                Ok(SessionResolution {
                    identity: None,
                    set_cookies: cleared_session_cookies(),
                })
            }
        }
    }

    #[instrument(skip_all)]
    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<SignedIn, IdentityError> {
        let response = self
            .with_key(self.http.post(self.token_endpoint("password")?))
            .json(&json!({
                "email": email.as_str(),
                "password": password.expose_secret(),
            }))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => response.json::<TokenGrant>().await?.into_signed_in(),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                Err(IdentityError::InvalidCredentials)
            }
            status => Err(IdentityError::UnexpectedStatus(status)),
        }
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, cookies: &CookieJar) -> Result<(), IdentityError> {
        let Some(access_token) = cookie_value(cookies, ACCESS_TOKEN_COOKIE) else {
            return Ok(());
        };

        let response = self
            .with_key(self.http.post(self.endpoint("auth/v1/logout")?))
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            // An already-expired session is as signed out as it gets
            status
                if status.is_success()
                    || status == StatusCode::UNAUTHORIZED
                    || status == StatusCode::FORBIDDEN =>
            {
                Ok(())
            }
            status => Err(IdentityError::UnexpectedStatus(status)),
        }
    }

    async fn health(&self) -> Result<(), IdentityError> {
        let response = self
            .with_key(self.http.get(self.endpoint("auth/v1/health")?))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(IdentityError::UnexpectedStatus(response.status()))
        }
    }
}
