//! Password hashing and verification using Argon2id
//!
//! Hashes use the argon2 crate's defaults (Argon2id, OWASP-recommended
//! parameters) with a fresh random salt per hash. Verification reads the
//! parameters back from the PHC string and compares in constant time.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};
use rand::{distributions::Alphanumeric, Rng};
use thiserror::Error;

/// Password hashing errors
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Failed to hash a password
    #[error("failed to hash password: {0}")]
    HashingFailed(String),

    /// Stored hash is not a valid PHC string
    #[error("invalid password hash format: {0}")]
    InvalidHash(String),

    /// Verification failed for a reason other than a wrong password
    #[error("failed to verify password: {0}")]
    VerificationFailed(String),
}

/// Hash a password with Argon2id and a random salt
///
/// # Errors
///
/// Returns [`PasswordError::HashingFailed`] if the hashing operation fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))
}

/// Verify a password against a stored PHC hash in constant time
///
/// # Errors
///
/// Returns an error if the hash is malformed or verification fails for a
/// reason other than a mismatch; a wrong password is `Ok(false)`.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerificationFailed(e.to_string())),
    }
}

/// Generate a random placeholder password for users created through OAuth
///
/// These users never log in with a local password; the placeholder only
/// exists so the record satisfies the required-hash invariant with an
/// unguessable value.
#[must_use]
pub fn random_placeholder_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("correct-horse-battery-staple").expect("hash");

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct-horse-battery-staple", &hash).expect("verify"));
        assert!(!verify_password("wrong-password", &hash).expect("verify wrong"));
    }

    #[test]
    fn different_salts_give_different_hashes() {
        let first = hash_password("same-password").expect("hash 1");
        let second = hash_password("same-password").expect("hash 2");
        assert_ne!(first, second);
    }

    #[test]
    fn invalid_hash_format_errors() {
        let result = verify_password("password", "not-a-phc-string");
        assert!(matches!(result, Err(PasswordError::InvalidHash(_))));
    }

    #[test]
    fn placeholder_passwords_are_long_and_unique() {
        let first = random_placeholder_password();
        let second = random_placeholder_password();
        assert_eq!(first.len(), 32);
        assert_ne!(first, second);
    }
}
