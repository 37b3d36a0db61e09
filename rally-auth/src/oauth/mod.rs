//! OAuth2 authorization-code flow and identity reconciliation
//!
//! The flow against the external provider has three stages, each a possible
//! failure point and none retried automatically:
//!
//! 1. **Authorize** - build the provider's authorization URL from
//!    configuration. No network call; cannot fail.
//! 2. **Exchange** - trade the authorization code for an access token at the
//!    provider's token endpoint.
//! 3. **Fetch profile** - read the provider's user-info endpoint with the
//!    access token, producing a [`ProviderProfile`].
//!
//! The profile then goes through [`IdentityReconciler`], which maps it onto
//! a local user record with atomic get-or-create semantics.

mod provider;
mod reconcile;

pub use provider::{AccessToken, OAuthFlow, ProviderProfile};
pub use reconcile::IdentityReconciler;
