//! Password hashing and validation.
//!
//! Uses Argon2id with tunable memory and time cost; the PHC-formatted hash
//! string carries the salt and parameters, so verification needs no
//! configuration.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use rand_core::OsRng;

use crate::config::AuthConfig;
use crate::{MmlloError, Result};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Parallelism (threads).
const P_COST: u32 = 4;

fn create_argon2(config: &AuthConfig) -> Result<Argon2<'static>> {
    let params = Params::new(config.argon2_memory_kib, config.argon2_iterations, P_COST, None)
        .map_err(|e| MmlloError::Config(format!("invalid Argon2 parameters: {e}")))?;
    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    ))
}

/// Check a candidate password against the length policy.
pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(MmlloError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(MmlloError::Validation(format!(
            "password must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password with Argon2id. Returns a PHC-formatted hash string.
pub fn hash_password(password: &str, config: &AuthConfig) -> Result<String> {
    validate_password(password)?;

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = create_argon2(config)?;
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| MmlloError::Auth(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash string.
///
/// Returns `Ok(false)` for a wrong password; only a malformed hash is an
/// error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed =
        PasswordHash::new(hash).map_err(|_| MmlloError::Auth("invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> AuthConfig {
        AuthConfig {
            argon2_memory_kib: 1024,
            argon2_iterations: 1,
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse battery", &fast_config()).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong password!", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let config = fast_config();
        let a = hash_password("same password", &config).unwrap();
        let b = hash_password("same password", &config).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_too_short_rejected() {
        let err = hash_password("short", &fast_config()).unwrap_err();
        assert!(matches!(err, MmlloError::Validation(_)));
    }

    #[test]
    fn test_too_long_rejected() {
        let long = "x".repeat(MAX_PASSWORD_LENGTH + 1);
        let err = hash_password(&long, &fast_config()).unwrap_err();
        assert!(matches!(err, MmlloError::Validation(_)));
    }

    #[test]
    fn test_malformed_hash_is_error() {
        assert!(verify_password("whatever!", "not-a-phc-string").is_err());
    }
}
