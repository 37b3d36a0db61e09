//! Postgres-backed user store
//!
//! Relies on the `users.email` unique constraint (see `migrations/`). The
//! get-or-create path is a single conditional insert: `ON CONFLICT (email)
//! DO NOTHING` followed by a re-fetch when the insert did not return a row.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{NewUser, StoreError, User, UserStore};

/// User store backed by a Postgres pool
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Wrap an existing connection pool
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (email, password_hash, display_name, image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, display_name, image_url, created_at
            ",
        )
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.display_name)
        .bind(&new_user.image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateEmail,
            _ => StoreError::Database(e),
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT id, email, password_hash, display_name, image_url, created_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT id, email, password_hash, display_name, image_url, created_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_or_create(&self, new_user: NewUser) -> Result<(User, bool), StoreError> {
        let inserted = sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (email, password_hash, display_name, image_url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, password_hash, display_name, image_url, created_at
            ",
        )
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.display_name)
        .bind(&new_user.image_url)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(user) = inserted {
            return Ok((user, true));
        }

        // The insert hit the unique constraint, so the row exists. Users are
        // never deleted, so this re-fetch cannot miss.
        let existing = sqlx::query_as::<_, User>(
            r"
            SELECT id, email, password_hash, display_name, image_url, created_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(&new_user.email)
        .fetch_one(&self.pool)
        .await?;

        Ok((existing, false))
    }

    async fn update_image_url(&self, id: i64, image_url: &str) -> Result<(), StoreError> {
        sqlx::query(
            r"
            UPDATE users
            SET image_url = $1
            WHERE id = $2
            ",
        )
        .bind(image_url)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
