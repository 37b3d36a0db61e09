//! Session cookie management
//!
//! The session token travels in a fixed-name HTTP-only cookie scoped to the
//! API base path, or alternatively in an `Authorization: Bearer` header,
//! which takes precedence when both are present. This module owns building
//! and clearing the `Set-Cookie` headers and extracting the token from
//! inbound requests.

use axum::http::{
    header::{AUTHORIZATION, COOKIE, SET_COOKIE},
    HeaderMap,
};

use crate::config::CookieSettings;

/// Attaches and clears the session cookie on outbound responses
#[derive(Clone)]
pub struct SessionCookieManager {
    settings: CookieSettings,
}

impl SessionCookieManager {
    /// Create a cookie manager from configuration
    #[must_use]
    pub const fn new(settings: CookieSettings) -> Self {
        Self { settings }
    }

    /// Attach the session token as a cookie on a response
    pub fn attach(&self, headers: &mut HeaderMap, token: &str) {
        self.append_cookie(headers, token, self.settings.max_age_secs);
    }

    /// Delete the session cookie
    ///
    /// Idempotent: clearing when no cookie was set still produces a valid
    /// expired cookie and never fails.
    pub fn clear(&self, headers: &mut HeaderMap) {
        self.append_cookie(headers, "", 0);
    }

    fn append_cookie(&self, headers: &mut HeaderMap, value: &str, max_age_secs: i64) {
        let mut cookie = format!(
            "{}={}; Path={}; Max-Age={}; SameSite={}",
            self.settings.name,
            value,
            self.settings.path,
            max_age_secs,
            self.settings.same_site.as_str()
        );

        if self.settings.http_only {
            cookie.push_str("; HttpOnly");
        }

        if self.settings.secure {
            cookie.push_str("; Secure");
        }

        if let Ok(header_value) = cookie.parse() {
            headers.append(SET_COOKIE, header_value);
        }
    }
}

/// Extract the session token from a request
///
/// The `Authorization: Bearer` header is checked first; the named cookie is
/// the fallback. Returns `None` when neither carries a token.
#[must_use]
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(bearer) = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        return Some(bearer.to_string());
    }

    let cookie_header = headers.get(COOKIE)?.to_str().ok()?;
    for cookie in cookie_header.split(';') {
        if let Some((name, value)) = cookie.trim().split_once('=') {
            if name.trim() == cookie_name {
                return Some(value.trim().to_string());
            }
        }
    }

    None
}
