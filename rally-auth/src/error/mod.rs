//! Error types and request-boundary error handling
//!
//! Every fallible operation in the crate returns a variant of [`AuthError`].
//! The variants stay distinct internally so logs and tests can tell failure
//! modes apart, while the [`IntoResponse`] implementation collapses every
//! authentication failure into a single client-facing message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::password::PasswordError;
use crate::store::StoreError;
use crate::token::TokenError;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum AuthError {
    /// Request lacks required login fields
    #[error("required credentials are missing")]
    MissingCredentials,

    /// Request payload failed validation
    #[error("invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// No user record matches the presented email or token subject
    #[error("user not found")]
    UserNotFound,

    /// Password hash verification failed
    #[error("incorrect password")]
    InvalidPassword,

    /// Session token expired
    #[error("session token expired")]
    TokenExpired,

    /// Session token failed signature or structural verification
    #[error("session token invalid")]
    TokenInvalid,

    /// Request carried neither a bearer header nor a session cookie
    #[error("no credentials presented")]
    Unauthenticated,

    /// Path named a provider that is not configured
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// Registration conflict on the unique email constraint
    #[error("email already registered")]
    DuplicateEmail,

    /// Authorization-code exchange with the provider failed
    #[error("authorization code exchange failed: {0}")]
    OAuthExchangeFailed(String),

    /// Profile fetch from the provider failed
    #[error("provider profile fetch failed: {0}")]
    OAuthProfileFailed(String),

    /// Unexpected internal failure (store, signing, hashing)
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Collapse any non-4xx-specific failure into the generic
    /// authentication failure, for the OAuth callback boundary.
    ///
    /// Provider and token failures already map to 401; store and other
    /// internal errors are folded into [`AuthError::Unauthenticated`] so the
    /// client never sees internal detail. The original error must be logged
    /// by the caller before normalizing.
    #[must_use]
    pub fn into_authentication_failure(self) -> Self {
        match self {
            Self::MissingCredentials => Self::MissingCredentials,
            Self::UnknownProvider(p) => Self::UnknownProvider(p),
            e @ (Self::UserNotFound
            | Self::InvalidPassword
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::Unauthenticated
            | Self::OAuthExchangeFailed(_)
            | Self::OAuthProfileFailed(_)) => e,
            _ => Self::Unauthenticated,
        }
    }

    /// HTTP status this error maps to at the request boundary
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingCredentials | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::UnknownProvider(_) => StatusCode::NOT_FOUND,
            Self::DuplicateEmail => StatusCode::CONFLICT,
            Self::UserNotFound
            | Self::InvalidPassword
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::Unauthenticated
            | Self::OAuthExchangeFailed(_)
            | Self::OAuthProfileFailed(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Self::TokenExpired,
            TokenError::Invalid => Self::TokenInvalid,
            TokenError::Signing(e) => Self::Internal(e),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => Self::DuplicateEmail,
            StoreError::Database(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Every authentication failure shares one message so responses do
        // not reveal whether an account exists or why a token was rejected.
        let message = match status {
            StatusCode::UNAUTHORIZED => "authentication failed",
            StatusCode::BAD_REQUEST => "required credentials are missing or invalid",
            StatusCode::NOT_FOUND => "unknown provider",
            StatusCode::CONFLICT => "email already registered",
            _ => "internal error",
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "request rejected");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
