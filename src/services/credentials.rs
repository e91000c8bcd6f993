//! One-way password hashing and verification.
//!
//! Hashes are Argon2id PHC strings: algorithm, version, cost parameters and
//! salt are embedded in the output, so verification needs no other state.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;
use tokio::task;

use crate::config::SecurityConfig;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Invalid Argon2 params: {0}")]
    InvalidParams(String),

    #[error("Failed to hash password: {0}")]
    Hash(String),

    #[error("Password hashing task failed: {0}")]
    Task(String),
}

/// Argon2id hasher with a fixed work factor taken from [`SecurityConfig`].
#[derive(Clone)]
pub struct CredentialVerifier {
    params: Params,
}

impl CredentialVerifier {
    pub fn new(config: &SecurityConfig) -> Result<Self, CredentialError> {
        let params = Params::new(
            config.argon2_memory_cost_kib,
            config.argon2_time_cost,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| CredentialError::InvalidParams(e.to_string()))?;

        Ok(Self { params })
    }

    /// Hashes on the calling thread. Prefer [`Self::hash`] from async code.
    pub fn hash_blocking(&self, plaintext: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());

        let hash = argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hash(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Returns `false` for a mismatch and for any hash that cannot be parsed.
    #[must_use]
    pub fn verify_blocking(plaintext: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            tracing::warn!("Stored password hash is malformed; rejecting credentials");
            return false;
        };

        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// Hashes on the blocking pool because Argon2 is CPU-intensive.
    pub async fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        let this = self.clone();
        let plaintext = plaintext.to_string();

        task::spawn_blocking(move || this.hash_blocking(&plaintext))
            .await
            .map_err(|e| CredentialError::Task(e.to_string()))?
    }

    pub async fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let plaintext = plaintext.to_string();
        let hash = hash.to_string();

        match task::spawn_blocking(move || Self::verify_blocking(&plaintext, &hash)).await {
            Ok(matched) => matched,
            Err(e) => {
                tracing::error!(error = %e, "Password verification task failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> CredentialVerifier {
        let config = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        };
        CredentialVerifier::new(&config).unwrap()
    }

    #[test]
    fn hash_then_verify() {
        let hash = verifier().hash_blocking("correctpass").unwrap();
        assert_ne!(hash, "correctpass");
        assert!(hash.starts_with("$argon2id$"));
        assert!(CredentialVerifier::verify_blocking("correctpass", &hash));
        assert!(!CredentialVerifier::verify_blocking("wrongpass", &hash));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let v = verifier();
        let a = v.hash_blocking("correctpass").unwrap();
        let b = v.hash_blocking("correctpass").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_fails_closed() {
        assert!(!CredentialVerifier::verify_blocking("anything", ""));
        assert!(!CredentialVerifier::verify_blocking("anything", "not-a-hash"));
        assert!(!CredentialVerifier::verify_blocking("anything", "$argon2id$v=19$broken"));
    }

    #[test]
    fn rejects_invalid_params() {
        let config = SecurityConfig {
            argon2_time_cost: 0,
            ..SecurityConfig::default()
        };
        assert!(matches!(
            CredentialVerifier::new(&config),
            Err(CredentialError::InvalidParams(_))
        ));
    }

    #[tokio::test]
    async fn async_hash_and_verify() {
        let v = verifier();
        let hash = v.hash("correctpass").await.unwrap();
        assert!(v.verify("correctpass", &hash).await);
        assert!(!v.verify("correctpas", &hash).await);
    }
}
