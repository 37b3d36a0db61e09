//! rally-auth: authentication and identity service for the Rally platform
//!
//! Two login paths terminate in the same signed session token:
//!
//! - **Local credentials** - email/password registration and login, with
//!   Argon2id password hashing.
//! - **OAuth2 authorization code** - a three-stage flow against one external
//!   identity provider (authorize URL, code exchange, profile fetch),
//!   followed by atomic get-or-create reconciliation with the local user
//!   store.
//!
//! Session tokens are HMAC-signed JWTs with a 60-minute lifetime, carried in
//! an HTTP-only cookie scoped to the API base path or an `Authorization:
//! Bearer` header. Validation is stateless; there is no server-side session
//! table.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rally_auth::{config::AppConfig, state::{self, AppState}, store::MemoryUserStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load()?;
//!     let state = AppState::new(config, Arc::new(MemoryUserStore::new()))?;
//!
//!     let app = state::router(state);
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod oauth;
pub mod session;
pub mod state;
pub mod store;
pub mod token;

pub mod prelude {
    //! Convenience re-exports for common types

    pub use crate::auth::{Authenticated, CredentialAuthenticator};
    pub use crate::config::AppConfig;
    pub use crate::error::AuthError;
    pub use crate::oauth::{IdentityReconciler, OAuthFlow, ProviderProfile};
    pub use crate::session::SessionCookieManager;
    pub use crate::state::{router, AppState};
    pub use crate::store::{MemoryUserStore, PgUserStore, User, UserStore};
    pub use crate::token::TokenService;
}
