use anyhow::anyhow;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::errors::AppError;

/// Upper bound on password length. Argon2 is intentionally slow, so
/// unbounded input is a CPU-exhaustion vector.
pub const MAX_PASSWORD_LENGTH: usize = 64;

/// Hashes a password with Argon2id and returns the PHC-format string.
/// The salt is embedded in the output, so the hash alone is stored.
pub fn hash(password: &str) -> Result<String, AppError> {
    if password.is_empty() {
        return Err(AppError::Validation("password must not be empty".to_string()));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }

    let salt = SaltString::generate(&mut OsRng);
    let hashed = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow!("password hashing failed: {e}")))?
        .to_string();

    Ok(hashed)
}

/// Verifies a password against a stored PHC-format hash.
/// An unparseable hash verifies as false rather than erroring, so a
/// corrupted row cannot be distinguished from a wrong password.
pub fn verify(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hashed = hash("correct horse battery").unwrap();
        assert!(verify("correct horse battery", &hashed));
        assert!(!verify("wrong password", &hashed));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash("same password").unwrap();
        let b = hash("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_password_rejected() {
        assert!(matches!(hash(""), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_overlong_password_rejected() {
        let long = "x".repeat(MAX_PASSWORD_LENGTH + 1);
        assert!(matches!(hash(&long), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_garbage_hash_verifies_false() {
        assert!(!verify("anything", "not-a-phc-string"));
    }
}
