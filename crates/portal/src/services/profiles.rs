//! Profile store: the `user_type` column keyed by user id.
//!
//! Backed by the managed database's REST interface:
//!
//! ```text
//! GET rest/v1/profiles?select=user_type&id=eq.<uuid>
//! ```

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use rakeback_core::{Role, RoleParseError, UserId};

use crate::config::IdentityServiceConfig;

/// Errors from role lookup.
#[derive(Debug, Error)]
pub enum RoleLookupError {
    #[error("profile request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("profile store returned {0}")]
    UnexpectedStatus(StatusCode),

    /// `user_type` holds something other than a known role.
    #[error(transparent)]
    UnknownRole(#[from] RoleParseError),

    #[error("invalid profile store url: {0}")]
    Url(#[from] url::ParseError),
}

/// Single-row role lookup.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Role of `user`. `Ok(None)` when there is no profile or no role on it.
    async fn role_for(&self, user: &UserId) -> Result<Option<Role>, RoleLookupError>;
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    user_type: Option<String>,
}

/// REST-backed profile store.
#[derive(Clone)]
pub struct ProfileStore {
    http: Client,
    base_url: Url,
    api_key: SecretString,
}

impl ProfileStore {
    #[must_use]
    pub fn new(http: Client, config: &IdentityServiceConfig) -> Self {
        Self {
            http,
            base_url: config.url.clone(),
            api_key: config.public_key.clone(),
        }
    }

    fn profile_url(&self, user: &UserId) -> Result<Url, RoleLookupError> {
        let mut url = self.base_url.join("rest/v1/profiles")?;
        url.query_pairs_mut()
            .append_pair("select", "user_type")
            .append_pair("id", &format!("eq.{user}"));
        Ok(url)
    }
}

#[async_trait]
impl RoleStore for ProfileStore {
    #[instrument(skip(self), fields(user_id = %user))]
    async fn role_for(&self, user: &UserId) -> Result<Option<Role>, RoleLookupError> {
        let key = self.api_key.expose_secret();
        let response = self
            .http
            .get(self.profile_url(user)?)
            .header("apikey", key)
            .bearer_auth(key)
            .header("accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RoleLookupError::UnexpectedStatus(response.status()));
        }

        let rows: Vec<ProfileRow> = response.json().await?;
        rows.into_iter()
            .next()
            .and_then(|row| row.user_type)
            .map(|user_type| user_type.parse::<Role>())
            .transpose()
            .map_err(RoleLookupError::from)
    }
}
