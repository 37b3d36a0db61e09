//! Session token issuance and validation
//!
//! Session tokens are compact JWTs signed with HMAC-SHA256. A token carries
//! the subject's user id, its issue time, and an expiry 60 minutes out
//! (configurable). Validation is a pure function of the token, the clock,
//! and the signing secret; there is no server-side token state.
//!
//! The signing secret is injected from configuration at startup. It is never
//! a compiled-in literal.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::TokenSettings;

/// Token validation and signing errors
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token's expiry is in the past
    #[error("token expired")]
    Expired,

    /// Signature or structural verification failed (includes malformed input)
    #[error("token invalid")]
    Invalid,

    /// Signing failed while issuing a token
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Claims carried by a session token
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject user id
    sub: i64,
    /// Issued-at, seconds since the epoch
    iat: i64,
    /// Expiry, seconds since the epoch
    exp: i64,
}

/// Issues and validates signed, time-bounded session tokens
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl TokenService {
    /// Create a token service from configuration
    #[must_use]
    pub fn new(settings: &TokenSettings) -> Self {
        Self {
            encoding: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding: DecodingKey::from_secret(settings.secret.as_bytes()),
            lifetime: Duration::seconds(settings.lifetime_secs),
        }
    }

    /// Issue a signed token for the given subject
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if the signing operation itself
    /// fails; with a configured secret this does not happen in practice.
    pub fn issue(&self, subject_id: i64) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject_id,
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Validate a token and return its subject id
    ///
    /// Verifies the HMAC signature and the expiry with zero leeway.
    ///
    /// # Errors
    ///
    /// - [`TokenError::Expired`] if the expiry is in the past
    /// - [`TokenError::Invalid`] for any signature or structural failure
    pub fn validate(&self, token: &str) -> Result<i64, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn settings(lifetime_secs: i64) -> TokenSettings {
        TokenSettings {
            secret: "unit-test-signing-secret".to_string(),
            lifetime_secs,
        }
    }

    #[test]
    fn round_trip() {
        let service = TokenService::new(&settings(3600));
        let token = service.issue(42).expect("issue");
        assert_eq!(service.validate(&token).expect("validate"), 42);
    }

    #[test]
    fn expired_token_fails_with_expired() {
        // Issue with a lifetime already in the past; the signature is valid
        // but the expiry is not.
        let service = TokenService::new(&settings(-120));
        let token = service.issue(7).expect("issue");
        assert!(matches!(service.validate(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn tampering_with_any_byte_invalidates() {
        let service = TokenService::new(&settings(3600));
        let token = service.issue(99).expect("issue");

        for i in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] ^= 0x01;
            let Ok(tampered) = String::from_utf8(bytes) else {
                continue;
            };
            if tampered == token {
                continue;
            }
            assert!(
                matches!(service.validate(&tampered), Err(TokenError::Invalid)),
                "byte {i} flip was not rejected"
            );
        }
    }

    #[test]
    fn garbage_input_is_invalid() {
        let service = TokenService::new(&settings(3600));
        assert!(matches!(
            service.validate("not-a-token"),
            Err(TokenError::Invalid)
        ));
        assert!(matches!(service.validate(""), Err(TokenError::Invalid)));
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let issuer = TokenService::new(&settings(3600));
        let verifier = TokenService::new(&TokenSettings {
            secret: "a-different-secret".to_string(),
            lifetime_secs: 3600,
        });

        let token = issuer.issue(1).expect("issue");
        assert!(matches!(
            verifier.validate(&token),
            Err(TokenError::Invalid)
        ));
    }

    proptest! {
        #[test]
        fn round_trip_any_subject(id in 1i64..=i64::MAX) {
            let service = TokenService::new(&settings(3600));
            let token = service.issue(id).unwrap();
            prop_assert_eq!(service.validate(&token).unwrap(), id);
        }
    }
}
