//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::PortalConfig;
use crate::services::identity::IdentityClient;
use crate::services::profiles::ProfileStore;
use crate::services::{IdentityService, RoleStore};

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// configuration and the external identity and profile services.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PortalConfig,
    identity: Arc<dyn IdentityService>,
    roles: Arc<dyn RoleStore>,
}

impl AppState {
    /// Create application state backed by the hosted identity service.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: PortalConfig) -> Result<Self, StateError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("rakeback-portal/", env!("CARGO_PKG_VERSION")))
            // Backstop only; the gate applies the per-lookup timeout itself
            .timeout(config.auth_timeout * 2)
            .build()?;

        let identity = IdentityClient::new(http.clone(), &config.identity, config.secure_cookies());
        let roles = ProfileStore::new(http, &config.identity);

        Ok(Self::with_services(
            config,
            Arc::new(identity),
            Arc::new(roles),
        ))
    }

    /// Create application state over explicit service implementations.
    #[must_use]
    pub fn with_services(
        config: PortalConfig,
        identity: Arc<dyn IdentityService>,
        roles: Arc<dyn RoleStore>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                identity,
                roles,
            }),
        }
    }

    /// Get a reference to the portal configuration.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    /// Get the identity service.
    #[must_use]
    pub fn identity(&self) -> &dyn IdentityService {
        self.inner.identity.as_ref()
    }

    /// Get the profile/role store.
    #[must_use]
    pub fn roles(&self) -> &dyn RoleStore {
        self.inner.roles.as_ref()
    }
}
