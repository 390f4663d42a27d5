//! Argon2 hashing and verification on the blocking thread pool.

use auth::PasswordError;
use auth::PasswordHasher;

use crate::domain::errors::AuthError;

pub async fn hash_secret(secret: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || PasswordHasher::new().hash(&secret))
        .await
        .map_err(|e| PasswordError::HashingFailed(format!("Hashing task failed: {}", e)))?
        .map_err(AuthError::from)
}

pub async fn verify_secret(secret: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || PasswordHasher::new().verify(&secret, &hash))
        .await
        .map_err(|e| PasswordError::VerificationFailed(format!("Verification task failed: {}", e)))?
        .map_err(AuthError::from)
}
