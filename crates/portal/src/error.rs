//! Unified error handling with Sentry integration.
//!
//! Route handlers that can fail return `Result<T, AppError>`. Authorization
//! failures are not errors: the gate answers them with redirects and never
//! produces an `AppError`.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::services::IdentityError;

/// Application-level error type for the portal.
#[derive(Debug, Error)]
pub enum AppError {
    /// Identity service call failed.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Identity service did not answer within the auth timeout.
    #[error("Identity service timed out after {}ms", .0.as_millis())]
    IdentityTimeout(Duration),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Identity(IdentityError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            Self::Identity(_) => StatusCode::BAD_GATEWAY,
            Self::IdentityTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        };

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Identity(IdentityError::InvalidCredentials) => "Invalid credentials",
            Self::Identity(_) | Self::IdentityTimeout(_) => "Authentication service unavailable",
        };

        (status, message).into_response()
    }
}

/// Set the Sentry user context for the current request.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::IdentityTimeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "Identity service timed out after 250ms");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Identity(IdentityError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Identity(IdentityError::UnexpectedStatus(
                StatusCode::SERVICE_UNAVAILABLE
            ))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::IdentityTimeout(Duration::from_secs(5))),
            StatusCode::GATEWAY_TIMEOUT
        );
    }
}
