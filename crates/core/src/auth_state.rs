//! Client-side auth-state provider.
//!
//! Holds the signed-in member as the browser last saw it. The provider is an
//! explicit object injected into the page host, not a global: it owns a
//! persistence backend and moves through a typed lifecycle.
//!
//! ```text
//! Uninitialized --begin_load--> Loading --complete_load--> Ready(member?)
//! ```
//!
//! State is loaded once; after that only `sign_in`/`sign_out` change it.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::routes::Viewer;
use crate::types::{Member, Role};

/// Errors from the persistence backend.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Backing storage could not be read or written.
    #[error("auth storage unavailable: {0}")]
    Unavailable(String),
    /// Stored value could not be decoded.
    #[error("stored auth state is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Where the provider keeps the signed-in member between page loads.
pub trait AuthPersistence {
    /// Read the stored member, if any.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if storage is unreadable or corrupt.
    fn load(&self) -> Result<Option<Member>, PersistenceError>;

    /// Replace the stored member (`None` clears it).
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if storage cannot be written.
    fn store(&self, member: Option<&Member>) -> Result<(), PersistenceError>;
}

/// Single-slot JSON storage, the shape of a browser `localStorage` key.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryStorage {
    /// Storage pre-filled with a raw value.
    #[must_use]
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }

    /// Current raw value.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl AuthPersistence for MemoryStorage {
    fn load(&self) -> Result<Option<Member>, PersistenceError> {
        let slot = self
            .slot
            .lock()
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))?;
        match slot.as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn store(&self, member: Option<&Member>) -> Result<(), PersistenceError> {
        let raw = member.map(serde_json::to_string).transpose()?;
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))?;
        *slot = raw;
        Ok(())
    }
}

/// Provider lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthLifecycle {
    #[default]
    Uninitialized,
    Loading,
    Ready(Option<Member>),
}

/// What consumers of the provider see.
///
/// Serialized in camelCase; this is also the body of `GET /api/auth/state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub is_logged_in: bool,
    pub is_loading: bool,
    pub role: Option<Role>,
}

impl AuthState {
    /// Initial load still in progress.
    pub const LOADING: Self = Self {
        is_logged_in: false,
        is_loading: true,
        role: None,
    };

    /// Loaded, nobody signed in.
    pub const SIGNED_OUT: Self = Self {
        is_logged_in: false,
        is_loading: false,
        role: None,
    };

    /// Loaded, signed in as `role`.
    #[must_use]
    pub const fn signed_in(role: Role) -> Self {
        Self {
            is_logged_in: true,
            is_loading: false,
            role: Some(role),
        }
    }

    /// The viewer this state describes. Meaningless while loading.
    #[must_use]
    pub fn viewer(&self) -> Viewer {
        if self.is_logged_in {
            Viewer::from(self.role)
        } else {
            Viewer::Anonymous
        }
    }
}

impl From<&AuthLifecycle> for AuthState {
    fn from(lifecycle: &AuthLifecycle) -> Self {
        match lifecycle {
            AuthLifecycle::Uninitialized | AuthLifecycle::Loading => Self::LOADING,
            AuthLifecycle::Ready(None) => Self::SIGNED_OUT,
            AuthLifecycle::Ready(Some(member)) => Self::signed_in(member.role),
        }
    }
}

/// Auth-state provider over an injected persistence backend.
#[derive(Debug)]
pub struct AuthProvider<P> {
    persistence: P,
    lifecycle: AuthLifecycle,
}

impl<P: AuthPersistence> AuthProvider<P> {
    #[must_use]
    pub const fn new(persistence: P) -> Self {
        Self {
            persistence,
            lifecycle: AuthLifecycle::Uninitialized,
        }
    }

    /// Enter `Loading`. Returns `false` if a load already started.
    pub fn begin_load(&mut self) -> bool {
        if self.lifecycle == AuthLifecycle::Uninitialized {
            self.lifecycle = AuthLifecycle::Loading;
            true
        } else {
            false
        }
    }

    /// Read persisted state and enter `Ready`.
    ///
    /// Unreadable storage resolves to signed out so gated pages redirect to
    /// login instead of showing a loading indicator forever.
    pub fn complete_load(&mut self) {
        if self.lifecycle != AuthLifecycle::Loading {
            return;
        }

        let member = match self.persistence.load() {
            Ok(member) => member,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Failed to load persisted auth state, treating as signed out"
                );
                None
            }
        };
        self.lifecycle = AuthLifecycle::Ready(member);
    }

    /// Run the one-time load. No-op on later calls.
    pub fn load(&mut self) {
        if self.begin_load() {
            self.complete_load();
        }
    }

    /// Record a successful sign-in.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the member cannot be persisted; the
    /// in-memory state is left unchanged in that case.
    pub fn sign_in(&mut self, member: Member) -> Result<(), PersistenceError> {
        self.persistence.store(Some(&member))?;
        self.lifecycle = AuthLifecycle::Ready(Some(member));
        Ok(())
    }

    /// Forget the signed-in member.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if storage cannot be cleared.
    pub fn sign_out(&mut self) -> Result<(), PersistenceError> {
        self.persistence.store(None)?;
        self.lifecycle = AuthLifecycle::Ready(None);
        Ok(())
    }

    #[must_use]
    pub const fn lifecycle(&self) -> &AuthLifecycle {
        &self.lifecycle
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        AuthState::from(&self.lifecycle)
    }

    #[must_use]
    pub const fn member(&self) -> Option<&Member> {
        match &self.lifecycle {
            AuthLifecycle::Ready(member) => member.as_ref(),
            _ => None,
        }
    }
}
