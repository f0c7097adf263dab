//! Identity service error types.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur talking to the identity service.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Transport failure (connect, TLS, body decode).
    #[error("identity service request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a status we do not handle.
    #[error("identity service returned {0}")]
    UnexpectedStatus(StatusCode),

    /// The service returned a user we cannot represent.
    #[error("malformed user from identity service: {0}")]
    MalformedUser(String),

    /// Email/password rejected at sign-in.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Endpoint URL could not be built.
    #[error("invalid identity service url: {0}")]
    Url(#[from] url::ParseError),
}
