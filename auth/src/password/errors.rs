use thiserror::Error;

/// Error type for hashing operations on passwords and refresh secrets.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Hashing failed: {0}")]
    HashingFailed(String),

    #[error("Hash verification failed: {0}")]
    VerificationFailed(String),
}
