//! Argon2id password storage for Tally accounts.
//!
//! Stored hashes are PHC strings. Login checks always run one Argon2
//! verification, even for unknown usernames, so response time does not
//! reveal which accounts exist.

use std::sync::LazyLock;

use argon2::{
    Argon2, PasswordHash,
    password_hash::{self, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tally_shared::AppError;
use thiserror::Error;

/// Hash checked when the username is unknown.
static DECOY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("tally-decoy-credential").ok());

/// Password storage failures. Wrong passwords are not errors.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Argon2 could not produce or check a hash.
    #[error("password hashing failed: {0}")]
    Argon2(password_hash::Error),

    /// The stored value is not a PHC hash.
    #[error("stored password hash is corrupt")]
    CorruptHash,
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Hashes a new or changed password with a fresh salt.
///
/// # Errors
///
/// Returns [`PasswordError::Argon2`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(PasswordError::Argon2)
}

/// Checks a login password against the account's stored hash.
///
/// `stored` is `None` when no account matched the username; the password is
/// then checked against a decoy and the result is always `false`.
///
/// # Errors
///
/// Returns [`PasswordError::CorruptHash`] if the stored hash cannot be parsed.
pub fn verify_password(password: &str, stored: Option<&str>) -> Result<bool, PasswordError> {
    let Some(stored) = stored else {
        if let Some(decoy) = DECOY_HASH.as_deref() {
            let _ = check(password, decoy);
        }
        return Ok(false);
    };
    check(password, stored)
}

fn check(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored).map_err(|_| PasswordError::CorruptHash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Argon2(e)),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("correct-horse-battery", true)]
    #[case("correct-horse-batterY", false)]
    #[case("", false)]
    fn test_login_password_check(#[case] attempt: &str, #[case] accepted: bool) {
        let stored = hash_password("correct-horse-battery").unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert_eq!(verify_password(attempt, Some(&stored)).unwrap(), accepted);
    }

    #[test]
    fn test_unknown_account_never_matches() {
        assert!(!verify_password("tally-decoy-credential", None).unwrap());
        assert!(!verify_password("anything", None).unwrap());
    }

    #[test]
    fn test_same_password_gets_new_salt() {
        let first = hash_password("change-me-please").unwrap();
        let second = hash_password("change-me-please").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("change-me-please", Some(&second)).unwrap());
    }

    #[test]
    fn test_corrupt_stored_hash_is_a_server_error() {
        let err = verify_password("change-me-please", Some("plaintext")).unwrap_err();
        assert!(matches!(err, PasswordError::CorruptHash));
        assert_eq!(AppError::from(err).status_code(), 500);
    }
}
