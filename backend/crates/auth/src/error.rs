//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{
    app_error::AppError,
    conversions::{classify_redis, classify_sqlx},
    kind::ErrorKind,
};
use platform::bearer::BearerError;
use thiserror::Error;

use crate::application::token_signer::TokenError;
use crate::domain::verifier::VerifyError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Provider name unknown or not configured
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Provider rejected the credential or could not be reached
    #[error("Provider verification failed: {0}")]
    ProviderVerificationFailed(#[source] VerifyError),

    /// Refresh token unknown, revoked, or lost a rotation race
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    /// Refresh session past its expiry
    #[error("Refresh token expired")]
    RefreshTokenExpired,

    /// Session points at a user that no longer exists
    #[error("User not found")]
    UserNotFound,

    /// Access-token store or session store unreachable
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Refresh-token digest collision on insert
    #[error("Duplicate refresh token")]
    DuplicateRefreshToken,

    #[error("Session not found")]
    SessionNotFound,

    /// No usable `Authorization: Bearer` header
    #[error("Missing bearer token")]
    MissingBearerToken,

    /// Access token failed signature or expiry checks
    #[error("Invalid access token: {0}")]
    InvalidAccessToken(#[from] TokenError),

    /// Access token valid but no longer the user's current token
    #[error("Access token revoked")]
    AccessTokenRevoked,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::UnsupportedProvider(_) => ErrorKind::BadRequest,
            AuthError::ProviderVerificationFailed(_)
            | AuthError::InvalidRefreshToken
            | AuthError::RefreshTokenExpired
            | AuthError::UserNotFound
            | AuthError::MissingBearerToken
            | AuthError::InvalidAccessToken(_)
            | AuthError::AccessTokenRevoked => ErrorKind::Unauthorized,
            AuthError::StoreUnavailable(_) => ErrorKind::ServiceUnavailable,
            AuthError::Database(e) => match classify_sqlx(e) {
                ErrorKind::ServiceUnavailable => ErrorKind::ServiceUnavailable,
                _ => ErrorKind::InternalServerError,
            },
            AuthError::DuplicateRefreshToken
            | AuthError::SessionNotFound
            | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// Server-side failures get a generic message; details stay in the log.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::StoreUnavailable(_) => {
                AppError::service_unavailable("Auth store unavailable")
                    .with_action("Retry later")
            }
            AuthError::Database(_) if self.kind() == ErrorKind::ServiceUnavailable => {
                AppError::service_unavailable("Auth store unavailable")
                    .with_action("Retry later")
            }
            AuthError::Database(_)
            | AuthError::DuplicateRefreshToken
            | AuthError::SessionNotFound
            | AuthError::Internal(_) => AppError::internal("Internal server error"),
            AuthError::RefreshTokenExpired
            | AuthError::InvalidRefreshToken
            | AuthError::UserNotFound => {
                AppError::new(self.kind(), self.to_string()).with_action("Sign in again")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::StoreUnavailable(msg) => {
                tracing::error!(message = %msg, "Auth store unavailable");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::DuplicateRefreshToken | AuthError::SessionNotFound => {
                tracing::error!(error = %self, "Auth session store inconsistency");
            }
            AuthError::ProviderVerificationFailed(VerifyError::ProviderUnavailable(msg)) => {
                tracing::warn!(message = %msg, "Identity provider unavailable");
            }
            AuthError::AccessTokenRevoked => {
                tracing::warn!("Superseded access token presented");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<VerifyError> for AuthError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::UnsupportedProvider(name) => AuthError::UnsupportedProvider(name),
            other => AuthError::ProviderVerificationFailed(other),
        }
    }
}

impl From<redis::RedisError> for AuthError {
    fn from(err: redis::RedisError) -> Self {
        match classify_redis(&err) {
            ErrorKind::ServiceUnavailable => AuthError::StoreUnavailable(err.to_string()),
            _ => AuthError::Internal(format!("redis: {err}")),
        }
    }
}

impl From<BearerError> for AuthError {
    fn from(_: BearerError) -> Self {
        AuthError::MissingBearerToken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AuthError::UnsupportedProvider("facebook".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        for err in [
            AuthError::ProviderVerificationFailed(VerifyError::InvalidCredential("x".into())),
            AuthError::InvalidRefreshToken,
            AuthError::RefreshTokenExpired,
            AuthError::UserNotFound,
            AuthError::MissingBearerToken,
            AuthError::InvalidAccessToken(TokenError::Expired),
            AuthError::AccessTokenRevoked,
        ] {
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED, "{err}");
        }
        assert_eq!(
            AuthError::StoreUnavailable("down".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AuthError::Database(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AuthError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AuthError::DuplicateRefreshToken.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_verify_error_conversion() {
        let err: AuthError = VerifyError::UnsupportedProvider("x".into()).into();
        assert!(matches!(err, AuthError::UnsupportedProvider(_)));

        let err: AuthError = VerifyError::ProviderUnavailable("timeout".into()).into();
        assert!(matches!(
            err,
            AuthError::ProviderVerificationFailed(VerifyError::ProviderUnavailable(_))
        ));
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let app = AuthError::Internal("secret detail".into()).to_app_error();
        assert!(!app.message().contains("secret detail"));
    }

    #[test]
    fn test_redis_io_error_is_store_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: AuthError = redis::RedisError::from(io).into();
        assert!(matches!(err, AuthError::StoreUnavailable(_)));
    }
}
