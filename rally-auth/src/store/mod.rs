//! User persistence
//!
//! The store owns the `User` entity and enforces the one-user-per-email
//! invariant. Two implementations are provided: [`PgUserStore`] backed by
//! Postgres, and [`MemoryUserStore`] for tests and local development. Both
//! guarantee that [`UserStore::get_or_create`] is atomic with respect to the
//! email uniqueness constraint - concurrent calls for the same new email
//! yield exactly one row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use thiserror::Error;

mod memory;
mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

/// A registered user
///
/// `password_hash` is never serialized; API responses carry every other
/// field.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    /// System-assigned id
    pub id: i64,
    /// Unique email address
    pub email: String,
    /// Argon2id PHC hash. OAuth-created users get a hash of a random
    /// placeholder password.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Display name
    pub display_name: String,
    /// Provider-supplied avatar URL, if any
    pub image_url: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Unique email address
    pub email: String,
    /// Pre-hashed password
    pub password_hash: String,
    /// Display name
    pub display_name: String,
    /// Avatar URL, if known at creation
    pub image_url: Option<String>,
}

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The email already identifies a user
    #[error("email already registered")]
    DuplicateEmail,

    /// Underlying database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// User store operations
///
/// Implementations must enforce email uniqueness and provide atomic
/// get-or-create semantics. Users are never deleted by this service.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateEmail`] if the email already exists.
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Look up a user by email
    ///
    /// # Errors
    ///
    /// Returns an error only on store failure; an unknown email is `None`.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Look up a user by id
    ///
    /// # Errors
    ///
    /// Returns an error only on store failure; an unknown id is `None`.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    /// Create a user keyed by email, or return the existing record
    ///
    /// The boolean is `true` when a row was created. This is a single atomic
    /// operation: a plain check-then-insert would race under concurrent
    /// callbacks for the same new email.
    ///
    /// # Errors
    ///
    /// Returns an error on store failure.
    async fn get_or_create(&self, new_user: NewUser) -> Result<(User, bool), StoreError>;

    /// Replace a user's avatar URL
    ///
    /// # Errors
    ///
    /// Returns an error on store failure.
    async fn update_image_url(&self, id: i64, image_url: &str) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_not_serialized() {
        let user = User {
            id: 1,
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            display_name: "A".to_string(),
            image_url: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2id"));
        assert!(json.contains("a@x.com"));
    }
}
