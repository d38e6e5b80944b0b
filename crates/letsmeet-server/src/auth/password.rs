//! Password hashing and verification using argon2id.
//!
//! Hashing is deliberately slow. Callers on the async runtime go through
//! [`hash_blocking`] and [`verify_blocking`], which run the work on the
//! blocking pool; the work runs to completion even if the caller is dropped.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use letsmeet_core::config::AuthConfig;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Invalid hashing parameters: {0}")]
    Params(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Stored password hash is unreadable: {0}")]
    StoredHash(String),

    #[error("Hashing task failed: {0}")]
    Task(String),
}

/// One-way password hashing capability.
pub trait CredentialService: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, CredentialError>;

    /// `Ok(false)` for a wrong password; `Err` only when the stored hash
    /// cannot be parsed.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialError>;
}

/// Argon2id with a configurable time cost.
#[derive(Debug, Clone)]
pub struct Argon2Credentials {
    params: Params,
}

impl Argon2Credentials {
    /// `cost` is the argon2 time cost; memory and parallelism use the
    /// argon2 defaults.
    pub fn new(cost: u32) -> Result<Self, CredentialError> {
        Self::with_params(Params::DEFAULT_M_COST, cost)
    }

    pub fn with_params(memory_kib: u32, cost: u32) -> Result<Self, CredentialError> {
        let params = Params::new(memory_kib, cost, Params::DEFAULT_P_COST, None)
            .map_err(|e| CredentialError::Params(e.to_string()))?;
        Ok(Self { params })
    }

    pub fn from_config(auth: &AuthConfig) -> Result<Self, CredentialError> {
        Self::with_params(auth.hash_memory_kib, auth.hash_cost)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl CredentialService for Argon2Credentials {
    fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hash(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| CredentialError::StoredHash(e.to_string()))?;
        // Parameters come from the stored hash, not from `self`.
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

/// Hash on the blocking pool.
pub async fn hash_blocking(
    credentials: &Arc<dyn CredentialService>,
    password: &str,
) -> Result<String, CredentialError> {
    let credentials = Arc::clone(credentials);
    let password = password.to_string();
    tokio::task::spawn_blocking(move || credentials.hash(&password))
        .await
        .map_err(|e| CredentialError::Task(e.to_string()))?
}

/// Verify on the blocking pool.
pub async fn verify_blocking(
    credentials: &Arc<dyn CredentialService>,
    password: &str,
    hash: &str,
) -> Result<bool, CredentialError> {
    let credentials = Arc::clone(credentials);
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || credentials.verify(&password, &hash))
        .await
        .map_err(|e| CredentialError::Task(e.to_string()))?
}
