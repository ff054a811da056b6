//! Password hashing behind a small trait so handlers never touch `argon2` directly.

use argon2::{
    password_hash::SaltString, Argon2, PasswordHash, PasswordHasher,
    PasswordVerifier as Argon2PasswordVerifier,
};
use rand::rngs::OsRng;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(String),
    #[error("password worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

pub trait PasswordVerifier: Send + Sync {
    /// Produce a salted digest of `plaintext`.
    ///
    /// # Errors
    /// Returns an error if the digest cannot be computed.
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError>;

    /// Check `plaintext` against a digest produced by [`PasswordVerifier::hash`].
    /// Malformed digests never verify.
    fn verify(&self, digest: &str, plaintext: &str) -> bool;
}

/// Argon2id with the crate's default parameters.
#[derive(Clone, Default)]
pub struct Argon2Verifier {
    argon2: Argon2<'static>,
}

impl Argon2Verifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordVerifier for Argon2Verifier {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| PasswordError::Hash(err.to_string()))
    }

    fn verify(&self, digest: &str, plaintext: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            tracing::warn!("Stored password digest is malformed");
            return false;
        };
        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

/// [`PasswordVerifier::hash`] on the blocking pool.
///
/// # Errors
/// Returns an error if hashing fails or the worker panics.
pub async fn hash_password(
    verifier: Arc<dyn PasswordVerifier>,
    plaintext: String,
) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || verifier.hash(&plaintext)).await?
}

/// [`PasswordVerifier::verify`] on the blocking pool. A failed worker never
/// verifies.
pub async fn verify_password(
    verifier: Arc<dyn PasswordVerifier>,
    digest: String,
    plaintext: String,
) -> bool {
    match tokio::task::spawn_blocking(move || verifier.verify(&digest, &plaintext)).await {
        Ok(verified) => verified,
        Err(err) => {
            error!("Password verification worker failed: {err}");
            false
        }
    }
}
