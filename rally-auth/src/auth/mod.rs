//! Local credential authentication
//!
//! [`CredentialAuthenticator`] covers the email/password path: registration,
//! login, and re-validation of the session token on protected requests. Both
//! login failure modes (unknown email, wrong password) stay distinct here
//! and collapse into one client-facing message at the request boundary.

use std::sync::Arc;

use crate::error::AuthError;
use crate::store::{NewUser, User, UserStore};
use crate::token::TokenService;

pub mod extractors;
pub mod password;

pub use extractors::Authenticated;

/// Authenticates users against the store and issues session tokens
#[derive(Clone)]
pub struct CredentialAuthenticator {
    store: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl CredentialAuthenticator {
    /// Create an authenticator over a store and token service
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    /// Register a new user with a locally hashed password
    ///
    /// # Errors
    ///
    /// [`AuthError::DuplicateEmail`] if the email is taken; internal errors
    /// if hashing or the store fail.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<User, AuthError> {
        let password_hash = password::hash_password(password)?;

        let user = self
            .store
            .create(NewUser {
                email: email.to_string(),
                password_hash,
                display_name: display_name.to_string(),
                image_url: None,
            })
            .await?;

        tracing::info!(user_id = user.id, "user registered");
        Ok(user)
    }

    /// Verify email/password credentials and issue a session token
    ///
    /// # Errors
    ///
    /// [`AuthError::UserNotFound`] for an unknown email,
    /// [`AuthError::InvalidPassword`] for a hash mismatch. Callers must not
    /// forward these distinct kinds to the client.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let user = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !password::verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidPassword);
        }

        let token = self.tokens.issue(user.id)?;
        tracing::info!(user_id = user.id, "user logged in");
        Ok((user, token))
    }

    /// Validate a session token and re-fetch its subject
    ///
    /// # Errors
    ///
    /// Token validation errors, or [`AuthError::UserNotFound`] if the
    /// subject no longer exists.
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let subject_id = self.tokens.validate(token)?;

        self.store
            .find_by_id(subject_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}
