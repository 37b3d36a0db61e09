//! HTTP handlers for the authentication API
//!
//! Every failure is translated at this boundary into a client-facing status
//! and message by [`AuthError`]'s `IntoResponse`; nothing is silently
//! swallowed. The OAuth callback additionally normalizes unexpected internal
//! errors into the generic authentication failure so provider error bodies
//! and internal detail never reach the client.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::Authenticated;
use crate::error::AuthError;
use crate::state::AppState;
use crate::store::User;

/// Registration payload
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address, unique per user
    #[validate(email)]
    pub email: String,
    /// Plaintext password, hashed before storage
    #[validate(length(min = 1))]
    pub password: String,
    /// Display name
    #[validate(length(min = 1))]
    pub display_name: String,
}

/// Login payload
///
/// Fields are optional so missing credentials map to the explicit
/// `MissingCredentials` kind instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: Option<String>,
    /// Plaintext password
    pub password: Option<String>,
}

/// OAuth callback payload
#[derive(Debug, Deserialize)]
pub struct CallbackRequest {
    /// Authorization code returned by the provider
    pub code: Option<String>,
}

/// Login response body
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Session token, also set as the session cookie
    pub jwt: String,
    /// Human-readable outcome
    pub message: String,
}

/// OAuth callback response body
#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    /// Session token, also set as the session cookie
    pub jwt: String,
    /// Avatar URL of the reconciled user, if any
    pub image_url: Option<String>,
}

/// Message-only response body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome
    pub message: String,
}

/// Authorization URL response body
#[derive(Debug, Serialize)]
pub struct AuthorizeResponse {
    /// Provider authorization URL for the client to follow
    pub auth_url: String,
}

/// Liveness probe
pub async fn health() -> &'static str {
    "ok"
}

/// `POST /api/register` - create a user from local credentials
///
/// # Errors
///
/// 400 on validation failure, 409 on a duplicate email.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    payload.validate()?;

    let user = state
        .authenticator()
        .register(&payload.email, &payload.password, &payload.display_name)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /api/login` - verify credentials, issue a token, set the cookie
///
/// # Errors
///
/// 400 when fields are missing; 401 with a single generic message for an
/// unknown email or a wrong password.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AuthError> {
    let email = payload
        .email
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingCredentials)?;
    let password = payload
        .password
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingCredentials)?;

    let (_user, token) = state.authenticator().login(email, password).await?;

    let mut response = Json(LoginResponse {
        jwt: token.clone(),
        message: "login successful".to_string(),
    })
    .into_response();
    state.cookies().attach(response.headers_mut(), &token);

    Ok(response)
}

/// `GET /api/user` - return the authenticated user
///
/// Token transport is the bearer header or the session cookie; the
/// [`Authenticated`] extractor rejects the request with 401 otherwise.
pub async fn current_user(Authenticated(user): Authenticated) -> Json<User> {
    Json(user)
}

/// `POST /api/logout` - clear the session cookie
///
/// Idempotent: succeeds whether or not a cookie was present. The token
/// itself stays valid until expiry; only the client-side cookie is cleared.
pub async fn logout(State(state): State<AppState>) -> Response {
    let mut response = Json(MessageResponse {
        message: "logout successful".to_string(),
    })
    .into_response();
    state.cookies().clear(response.headers_mut());

    response
}

/// `GET /api/oauth/{provider}` - return the provider authorization URL
///
/// # Errors
///
/// 404 when the path names a provider other than the configured one.
pub async fn oauth_authorize(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Json<AuthorizeResponse>, AuthError> {
    if provider != state.oauth().provider_name() {
        return Err(AuthError::UnknownProvider(provider));
    }

    Ok(Json(AuthorizeResponse {
        auth_url: state.oauth().authorization_url(),
    }))
}

/// `POST /api/oauth/{provider}/callback` - complete the authorization-code
/// flow
///
/// Exchange, profile fetch, and reconciliation each fail independently; any
/// failure is logged with its precise kind and then collapsed into the
/// generic authentication failure for the client.
///
/// # Errors
///
/// 404 for an unknown provider, 400 for a missing code, 401 for any stage
/// failure.
pub async fn oauth_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Json(payload): Json<CallbackRequest>,
) -> Result<Response, AuthError> {
    if provider != state.oauth().provider_name() {
        return Err(AuthError::UnknownProvider(provider));
    }

    let code = payload
        .code
        .filter(|c| !c.is_empty())
        .ok_or(AuthError::MissingCredentials)?;

    match run_callback(&state, &code).await {
        Ok(response) => Ok(response),
        Err(err) => {
            tracing::warn!(provider = %provider, error = %err, "oauth callback failed");
            Err(err.into_authentication_failure())
        }
    }
}

/// The three callback stages followed by token issuance
async fn run_callback(state: &AppState, code: &str) -> Result<Response, AuthError> {
    let access_token = state.oauth().exchange_code(code).await?;
    let profile = state.oauth().fetch_profile(&access_token).await?;
    let user = state.reconciler().reconcile(&profile).await?;
    let token = state.tokens().issue(user.id)?;

    let mut response = Json(CallbackResponse {
        jwt: token.clone(),
        image_url: user.image_url,
    })
    .into_response();
    state.cookies().attach(response.headers_mut(), &token);

    Ok(response)
}
