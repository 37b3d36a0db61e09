//! Provider client for the OAuth2 authorization-code flow

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::config::ProviderSettings;
use crate::error::AuthError;

/// Access token returned by the provider's token endpoint
///
/// Held only for the duration of the callback request and dropped after the
/// profile fetch. The inner value is redacted from `Debug` output so it
/// cannot leak through logs.
pub struct AccessToken(String);

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([redacted])")
    }
}

/// Identity attributes fetched from the provider's user-info endpoint
#[derive(Debug, Clone)]
pub struct ProviderProfile {
    /// Email address
    pub email: String,
    /// Display name
    pub display_name: String,
    /// Avatar URL; absence is not an error
    pub avatar_url: Option<String>,
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    access_token: Option<String>,
}

/// User-info endpoint response
#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    email: String,
    displayname: String,
    #[serde(default)]
    image: Option<UserInfoImage>,
}

/// Nested avatar object in the user-info response
#[derive(Debug, Deserialize)]
struct UserInfoImage {
    #[serde(default)]
    link: Option<String>,
}

/// Client for one configured OAuth2 provider
///
/// Both network stages share one `reqwest` client with a configured timeout,
/// and each stage is a single attempt - a failed exchange or profile fetch
/// surfaces as its own error kind instead of being retried.
pub struct OAuthFlow {
    settings: ProviderSettings,
    authorize_endpoint: Url,
    http: reqwest::Client,
}

impl OAuthFlow {
    /// Create a provider client from configuration
    ///
    /// Parses the authorization endpoint once so URL construction later
    /// cannot fail, and builds the shared HTTP client with the configured
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the authorization URL is malformed or the HTTP
    /// client cannot be built.
    pub fn new(settings: ProviderSettings) -> anyhow::Result<Self> {
        let authorize_endpoint = Url::parse(&settings.authorize_url)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.http_timeout_secs))
            .build()?;

        Ok(Self {
            settings,
            authorize_endpoint,
            http,
        })
    }

    /// Name of the configured provider, as used in request paths
    #[must_use]
    pub fn provider_name(&self) -> &str {
        &self.settings.name
    }

    /// Build the provider's authorization URL
    ///
    /// Deterministic over the configured client id and redirect URI; makes
    /// no network call.
    #[must_use]
    pub fn authorization_url(&self) -> String {
        let mut url = self.authorize_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.settings.client_id)
            .append_pair("redirect_uri", &self.settings.redirect_uri)
            .append_pair("response_type", "code");
        url.to_string()
    }

    /// Exchange an authorization code for an access token
    ///
    /// # Errors
    ///
    /// [`AuthError::OAuthExchangeFailed`] on a transport error, timeout,
    /// non-success status, or a response without an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<AccessToken, AuthError> {
        let response = self
            .http
            .post(&self.settings.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AuthError::OAuthExchangeFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::OAuthExchangeFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let token: TokenEndpointResponse = response
            .json()
            .await
            .map_err(|e| AuthError::OAuthExchangeFailed(e.to_string()))?;

        token
            .access_token
            .map(AccessToken)
            .ok_or_else(|| AuthError::OAuthExchangeFailed("response missing access token".to_string()))
    }

    /// Fetch the provider profile with an access token
    ///
    /// # Errors
    ///
    /// [`AuthError::OAuthProfileFailed`] on a transport error, timeout,
    /// non-success status, or an unparseable body.
    pub async fn fetch_profile(&self, token: &AccessToken) -> Result<ProviderProfile, AuthError> {
        let response = self
            .http
            .get(&self.settings.userinfo_url)
            .bearer_auth(&token.0)
            .send()
            .await
            .map_err(|e| AuthError::OAuthProfileFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::OAuthProfileFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let info: UserInfoResponse = response
            .json()
            .await
            .map_err(|e| AuthError::OAuthProfileFailed(e.to_string()))?;

        Ok(ProviderProfile {
            email: info.email,
            display_name: info.displayname,
            avatar_url: info.image.and_then(|image| image.link),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ProviderSettings {
        ProviderSettings {
            name: "intra".to_string(),
            client_id: "test-client-id".to_string(),
            client_secret: "test-client-secret".to_string(),
            authorize_url: "https://provider.example/oauth/authorize".to_string(),
            token_url: "https://provider.example/oauth/token".to_string(),
            userinfo_url: "https://provider.example/v2/me".to_string(),
            redirect_uri: "https://rally.example/oauth/callback".to_string(),
            http_timeout_secs: 10,
        }
    }

    #[test]
    fn authorization_url_is_deterministic() {
        let flow = OAuthFlow::new(settings()).unwrap();

        let url = flow.authorization_url();
        assert_eq!(url, flow.authorization_url());
        assert!(url.starts_with("https://provider.example/oauth/authorize?"));
        assert!(url.contains("client_id=test-client-id"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Frally.example%2Foauth%2Fcallback"));
    }

    #[test]
    fn malformed_authorize_url_is_rejected_at_startup() {
        let mut bad = settings();
        bad.authorize_url = "not a url".to_string();
        assert!(OAuthFlow::new(bad).is_err());
    }

    #[test]
    fn access_token_debug_is_redacted() {
        let token = AccessToken("super-secret-value".to_string());
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("super-secret-value"));
    }

    #[test]
    fn profile_maps_nested_avatar_link() {
        let info: UserInfoResponse = serde_json::from_str(
            r#"{"email": "a@x.com", "displayname": "A", "image": {"link": "https://cdn.example/a.png"}}"#,
        )
        .unwrap();

        assert_eq!(info.email, "a@x.com");
        assert_eq!(
            info.image.and_then(|i| i.link).as_deref(),
            Some("https://cdn.example/a.png")
        );
    }

    #[test]
    fn profile_without_avatar_parses() {
        let info: UserInfoResponse =
            serde_json::from_str(r#"{"email": "a@x.com", "displayname": "A"}"#).unwrap();
        assert!(info.image.is_none());

        let info: UserInfoResponse = serde_json::from_str(
            r#"{"email": "a@x.com", "displayname": "A", "image": {}}"#,
        )
        .unwrap();
        assert!(info.image.and_then(|i| i.link).is_none());
    }

    #[test]
    fn token_response_without_access_token_parses_to_none() {
        let token: TokenEndpointResponse =
            serde_json::from_str(r#"{"error": "invalid_grant"}"#).unwrap();
        assert!(token.access_token.is_none());
    }
}
