//! Passcode hashing and verification with Argon2id.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::Arc;

use super::errors::{AuthError, AuthResult};

/// Argon2 cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory size in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl HashCost {
    /// Argon2 defaults with a custom number of passes
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations,
            ..Self::default()
        }
    }

    /// Cheapest parameters Argon2 accepts; only for tests
    pub fn testing() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: Params::MIN_T_COST,
            parallelism: Params::MIN_P_COST,
        }
    }
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// One-way salted passcode hasher
///
/// Cloning is cheap; clones share the decoy hash.
#[derive(Clone)]
pub struct PasscodeHasher {
    params: Params,
    decoy_hash: Arc<str>,
}

impl PasscodeHasher {
    /// Create a hasher with the given cost
    ///
    /// # Errors
    ///
    /// * `AuthError::HashingFailed` - Parameters rejected by Argon2
    pub fn new(cost: HashCost) -> AuthResult<Self> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|_| AuthError::HashingFailed)?;

        let salt = SaltString::generate(&mut OsRng);
        let decoy_hash = argon2(&params)
            .hash_password(salt.as_str().as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string();

        Ok(Self {
            params,
            decoy_hash: decoy_hash.into(),
        })
    }

    /// Hash a passcode into a PHC string with a fresh random salt
    pub fn hash(&self, passcode: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        Ok(argon2(&self.params)
            .hash_password(passcode.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    /// Verify a passcode against a stored hash
    ///
    /// The stored hash carries its own parameters, so hashes created under an
    /// older cost still verify. Unparsable hashes never match.
    pub fn verify(&self, passcode: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };

        argon2(&self.params)
            .verify_password(passcode.as_bytes(), &parsed)
            .is_ok()
    }

    /// Spend the same effort as [`verify`](Self::verify) for a user that does not exist
    pub fn verify_absent(&self, passcode: &str) -> bool {
        let _ = self.verify(passcode, &self.decoy_hash);
        false
    }

    /// [`hash`](Self::hash) on the blocking thread pool
    pub async fn hash_blocking(&self, passcode: String) -> AuthResult<String> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&passcode))
            .await
            .map_err(|_| AuthError::HashingFailed)?
    }

    /// [`verify`](Self::verify) on the blocking thread pool; `None` hash verifies against the decoy
    pub async fn verify_blocking(&self, passcode: String, hash: Option<String>) -> bool {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => hasher.verify(&passcode, &hash),
            None => hasher.verify_absent(&passcode),
        })
        .await
        .unwrap_or(false)
    }
}

fn argon2(params: &Params) -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone())
}
