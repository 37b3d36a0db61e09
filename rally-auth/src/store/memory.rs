//! In-memory user store
//!
//! Used by the test suite and for running the service locally without a
//! database. Each operation holds the single mutex for its full duration,
//! which gives the same atomicity guarantees the Postgres store derives from
//! its unique constraint.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use super::{NewUser, StoreError, User, UserStore};

/// In-process user store
#[derive(Default)]
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    users: Vec<User>,
}

impl Inner {
    fn insert(&mut self, new_user: NewUser) -> User {
        self.next_id += 1;
        let user = User {
            id: self.next_id,
            email: new_user.email,
            password_hash: new_user.password_hash,
            display_name: new_user.display_name,
            image_url: new_user.image_url,
            created_at: Utc::now(),
        };
        self.users.push(user.clone());
        user
    }
}

impl MemoryUserStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.lock();
        if inner.users.iter().any(|u| u.email == new_user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        Ok(inner.insert(new_user))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_or_create(&self, new_user: NewUser) -> Result<(User, bool), StoreError> {
        let mut inner = self.inner.lock();
        if let Some(existing) = inner.users.iter().find(|u| u.email == new_user.email) {
            return Ok((existing.clone(), false));
        }
        Ok((inner.insert(new_user), true))
    }

    async fn update_image_url(&self, id: i64, image_url: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if let Some(user) = inner.users.iter_mut().find(|u| u.id == id) {
            user.image_url = Some(image_url.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            display_name: "Test".to_string(),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn create_then_find() {
        let store = MemoryUserStore::new();
        let user = store.create(new_user("a@x.com")).await.unwrap();

        let by_email = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        let by_id = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "a@x.com");
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let store = MemoryUserStore::new();
        store.create(new_user("a@x.com")).await.unwrap();

        let err = store.create(new_user("a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let store = MemoryUserStore::new();

        let (first, created) = store.get_or_create(new_user("a@x.com")).await.unwrap();
        assert!(created);

        let (second, created) = store.get_or_create(new_user("a@x.com")).await.unwrap();
        assert!(!created);
        assert_eq!(second.id, first.id);
    }

    #[tokio::test]
    async fn update_image_url_replaces_value() {
        let store = MemoryUserStore::new();
        let user = store.create(new_user("a@x.com")).await.unwrap();

        store
            .update_image_url(user.id, "https://cdn.example/a.png")
            .await
            .unwrap();

        let updated = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(updated.image_url.as_deref(), Some("https://cdn.example/a.png"));
    }
}
