//! Reconciliation of provider identities with local user records

use std::sync::Arc;

use crate::auth::password::{hash_password, random_placeholder_password};
use crate::error::AuthError;
use crate::oauth::ProviderProfile;
use crate::store::{NewUser, User, UserStore};

/// Maps a provider profile onto a local user via get-or-create
///
/// One local user per external identity: the profile email is the key, and
/// the store's atomic get-or-create guarantees that two concurrent callbacks
/// for the same new identity produce a single row. Reconciliation is never
/// rolled back - a retried callback simply finds the user it created.
#[derive(Clone)]
pub struct IdentityReconciler {
    store: Arc<dyn UserStore>,
}

impl IdentityReconciler {
    /// Create a reconciler over a user store
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Return the local user for a provider profile, creating one if absent
    ///
    /// New users get the profile's display name and avatar, plus the hash of
    /// a random placeholder password - OAuth users never log in locally, but
    /// the record must still carry an unguessable hash. On the existing-user
    /// path, a present avatar URL that differs from the stored one refreshes
    /// it; an absent avatar leaves the stored value untouched.
    ///
    /// # Errors
    ///
    /// Propagates store and hashing failures.
    pub async fn reconcile(&self, profile: &ProviderProfile) -> Result<User, AuthError> {
        let password_hash = hash_password(&random_placeholder_password())?;

        let (mut user, created) = self
            .store
            .get_or_create(NewUser {
                email: profile.email.clone(),
                password_hash,
                display_name: profile.display_name.clone(),
                image_url: profile.avatar_url.clone(),
            })
            .await?;

        if !created {
            if let Some(avatar_url) = &profile.avatar_url {
                if user.image_url.as_deref() != Some(avatar_url) {
                    self.store.update_image_url(user.id, avatar_url).await?;
                    user.image_url = Some(avatar_url.clone());
                }
            }
        }

        tracing::info!(user_id = user.id, created, "provider identity reconciled");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryUserStore;

    fn profile(email: &str, avatar_url: Option<&str>) -> ProviderProfile {
        ProviderProfile {
            email: email.to_string(),
            display_name: "Player One".to_string(),
            avatar_url: avatar_url.map(ToString::to_string),
        }
    }

    #[tokio::test]
    async fn creates_user_on_first_reconcile() {
        let store = Arc::new(MemoryUserStore::new());
        let reconciler = IdentityReconciler::new(store.clone());

        let user = reconciler
            .reconcile(&profile("a@x.com", Some("https://cdn.example/a.png")))
            .await
            .unwrap();

        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.display_name, "Player One");
        assert_eq!(user.image_url.as_deref(), Some("https://cdn.example/a.png"));
        assert!(user.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn repeated_reconcile_returns_the_same_user() {
        let store = Arc::new(MemoryUserStore::new());
        let reconciler = IdentityReconciler::new(store.clone());

        let first = reconciler.reconcile(&profile("a@x.com", None)).await.unwrap();
        let second = reconciler.reconcile(&profile("a@x.com", None)).await.unwrap();

        assert_eq!(second.id, first.id);
        assert!(store.find_by_email("a@x.com").await.unwrap().is_some());

        // Exactly one row: a different id would mean a second insert.
        assert!(store.find_by_id(first.id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn new_avatar_refreshes_existing_user() {
        let store = Arc::new(MemoryUserStore::new());
        let reconciler = IdentityReconciler::new(store.clone());

        reconciler
            .reconcile(&profile("a@x.com", Some("https://cdn.example/old.png")))
            .await
            .unwrap();

        let updated = reconciler
            .reconcile(&profile("a@x.com", Some("https://cdn.example/new.png")))
            .await
            .unwrap();

        assert_eq!(
            updated.image_url.as_deref(),
            Some("https://cdn.example/new.png")
        );

        let stored = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(
            stored.image_url.as_deref(),
            Some("https://cdn.example/new.png")
        );
    }

    #[tokio::test]
    async fn absent_avatar_leaves_stored_value() {
        let store = Arc::new(MemoryUserStore::new());
        let reconciler = IdentityReconciler::new(store.clone());

        reconciler
            .reconcile(&profile("a@x.com", Some("https://cdn.example/a.png")))
            .await
            .unwrap();

        let second = reconciler.reconcile(&profile("a@x.com", None)).await.unwrap();
        assert_eq!(second.image_url.as_deref(), Some("https://cdn.example/a.png"));
    }

    #[tokio::test]
    async fn placeholder_hashes_differ_between_users() {
        let store = Arc::new(MemoryUserStore::new());
        let reconciler = IdentityReconciler::new(store.clone());

        let a = reconciler.reconcile(&profile("a@x.com", None)).await.unwrap();
        let b = reconciler.reconcile(&profile("b@x.com", None)).await.unwrap();

        assert_ne!(a.password_hash, b.password_hash);
    }
}
