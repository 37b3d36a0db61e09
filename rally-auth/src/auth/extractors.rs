//! Authentication extractor for Axum handlers
//!
//! [`Authenticated`] pulls the session token from the request (bearer header
//! first, then the session cookie), validates it, and re-fetches the user.
//! Handlers that take `Authenticated(user)` never run for unauthenticated
//! requests.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::error::AuthError;
use crate::session::extract_token;
use crate::state::AppState;
use crate::store::User;

/// Authenticated user extractor for protected routes
///
/// # Example
///
/// ```rust,no_run
/// use rally_auth::auth::Authenticated;
/// use axum::Json;
/// use rally_auth::store::User;
///
/// async fn current_user(Authenticated(user): Authenticated) -> Json<User> {
///     Json(user)
/// }
/// ```
pub struct Authenticated(pub User);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);

        let token = extract_token(&parts.headers, &app.config().cookie.name)
            .ok_or(AuthError::Unauthenticated)?;

        let user = app.authenticator().authenticate(&token).await?;
        Ok(Self(user))
    }
}
