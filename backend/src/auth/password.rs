//! Password hashing using argon2
//!
//! Provides secure password hashing and verification.
//!
//! # Performance Considerations
//!
//! Argon2 is intentionally CPU-intensive. Request handlers go through the
//! `*_async` variants, which run on the blocking thread pool.

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

/// Password hashing service
///
/// Uses Argon2id with the crate's default cost parameters. The salt is
/// embedded in the PHC-formatted digest, so the digest alone is enough to
/// verify a later login.
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using argon2 (blocking operation)
    pub fn hash(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
        Ok(hash.to_string())
    }

    /// Hash a password asynchronously (non-blocking)
    ///
    /// Spawns the CPU-intensive work on a blocking thread pool,
    /// preventing it from blocking the async runtime.
    pub async fn hash_async(password: SecretString) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::hash(password.expose_secret()))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password against a digest (blocking operation)
    ///
    /// A malformed digest never matches; it is logged and reported as `false`
    /// rather than surfaced to the caller.
    pub fn verify(password: &str, digest: &str) -> bool {
        let parsed = match PasswordHash::new(digest) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "stored password digest is malformed");
                return false;
            }
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Verify a password asynchronously (non-blocking)
    ///
    /// Spawns the CPU-intensive work on a blocking thread pool.
    pub async fn verify_async(password: SecretString, digest: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify(password.expose_secret(), &digest))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "secure_password_123";
        let hash = PasswordService::hash(password).unwrap();

        assert!(PasswordService::verify(password, &hash));
        assert!(!PasswordService::verify("wrong_password", &hash));
    }

    #[test]
    fn test_digest_does_not_contain_password() {
        let password = "plain-text-should-not-appear";
        let hash = PasswordService::hash(password).unwrap();

        assert!(!hash.contains(password));
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let password = "test_password";
        let hash1 = PasswordService::hash(password).unwrap();
        let hash2 = PasswordService::hash(password).unwrap();

        // Hashes should be different due to random salt
        assert_ne!(hash1, hash2);

        // But both should verify correctly
        assert!(PasswordService::verify(password, &hash1));
        assert!(PasswordService::verify(password, &hash2));
    }

    #[test]
    fn test_malformed_digest_is_false_not_error() {
        assert!(!PasswordService::verify("anything", "not-a-valid-hash"));
        assert!(!PasswordService::verify("anything", ""));
    }

    #[tokio::test]
    async fn test_async_hash_and_verify() {
        let password = "async_test_password";
        let hash = PasswordService::hash_async(SecretString::new(password.to_string()))
            .await
            .unwrap();

        assert!(
            PasswordService::verify_async(SecretString::new(password.to_string()), hash.clone())
                .await
                .unwrap()
        );
        assert!(
            !PasswordService::verify_async(SecretString::new("wrong".to_string()), hash)
                .await
                .unwrap()
        );
    }

    proptest! {
        // Argon2 is deliberately slow, keep the case count small
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_only_the_original_password_verifies(
            password in "[ -~]{6,32}",
            other in "[ -~]{6,32}",
        ) {
            let hash = PasswordService::hash(&password).unwrap();
            prop_assert!(PasswordService::verify(&password, &hash));
            if other != password {
                prop_assert!(!PasswordService::verify(&other, &hash));
            }
        }
    }
}
