//! Application state and router assembly

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::auth::CredentialAuthenticator;
use crate::config::AppConfig;
use crate::handlers;
use crate::oauth::{IdentityReconciler, OAuthFlow};
use crate::session::SessionCookieManager;
use crate::store::UserStore;
use crate::token::TokenService;

/// Shared application state
///
/// Cheap to clone; everything inside is behind an `Arc` or itself cheap.
#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    authenticator: CredentialAuthenticator,
    reconciler: IdentityReconciler,
    oauth: Arc<OAuthFlow>,
    cookies: SessionCookieManager,
    tokens: TokenService,
}

impl AppState {
    /// Build application state from configuration and a user store
    ///
    /// # Errors
    ///
    /// Returns an error if the provider client cannot be constructed (for
    /// example, a malformed authorization URL).
    pub fn new(config: AppConfig, store: Arc<dyn UserStore>) -> anyhow::Result<Self> {
        let tokens = TokenService::new(&config.token);
        let oauth = Arc::new(OAuthFlow::new(config.oauth.clone())?);
        let cookies = SessionCookieManager::new(config.cookie.clone());
        let authenticator = CredentialAuthenticator::new(Arc::clone(&store), tokens.clone());
        let reconciler = IdentityReconciler::new(store);

        Ok(Self {
            config: Arc::new(config),
            authenticator,
            reconciler,
            oauth,
            cookies,
            tokens,
        })
    }

    /// Application configuration
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Credential authenticator
    #[must_use]
    pub const fn authenticator(&self) -> &CredentialAuthenticator {
        &self.authenticator
    }

    /// Identity reconciler
    #[must_use]
    pub const fn reconciler(&self) -> &IdentityReconciler {
        &self.reconciler
    }

    /// Provider client
    #[must_use]
    pub fn oauth(&self) -> &OAuthFlow {
        &self.oauth
    }

    /// Session cookie manager
    #[must_use]
    pub const fn cookies(&self) -> &SessionCookieManager {
        &self.cookies
    }

    /// Token service
    #[must_use]
    pub const fn tokens(&self) -> &TokenService {
        &self.tokens
    }
}

/// Build the service router
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::health))
        .route("/api/register", post(handlers::register))
        .route("/api/login", post(handlers::login))
        .route("/api/user", get(handlers::current_user))
        .route("/api/logout", post(handlers::logout))
        .route("/api/oauth/{provider}", get(handlers::oauth_authorize))
        .route(
            "/api/oauth/{provider}/callback",
            post(handlers::oauth_callback),
        )
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .with_state(state)
}
