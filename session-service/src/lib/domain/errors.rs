use chrono::DateTime;
use chrono::Utc;
use thiserror::Error;

/// Error for IdentityId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for Login validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoginError {
    #[error("Login too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Login too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Login contains invalid characters (only alphanumeric, underscore, hyphen and dot allowed)")]
    InvalidCharacters,
}

/// Error for password policy violations at registration
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Password too long: maximum {max} characters")]
    TooLong { max: usize },
}

/// How an [`AuthError`] must be treated by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed input, rejected before touching any store.
    Validation,
    /// The requested resource already exists.
    Conflict,
    /// Credentials did not match. Callers must not learn which half was wrong.
    Authentication,
    /// The presented token pair is no longer usable; re-authenticate.
    Authorization,
    /// Authenticated but lacking the elevated-privilege flag.
    Privilege,
    /// Store, hashing or signing failure. Detail is logged, never returned.
    Infrastructure,
}

/// Top-level error for every session and token operation.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid identity ID: {0}")]
    InvalidIdentityId(#[from] IdentityIdError),

    #[error("Invalid login: {0}")]
    InvalidLogin(#[from] LoginError),

    #[error("Invalid password: {0}")]
    InvalidPassword(#[from] PasswordPolicyError),

    // Credential errors
    #[error("Login already exists: {0}")]
    LoginTaken(String),

    #[error("No identity with login: {0}")]
    LoginNotFound(String),

    #[error("Password incorrect")]
    PasswordIncorrect,

    // Token and session errors
    #[error("Access token is invalid")]
    InvalidToken,

    #[error("Session is not active for identity {0}")]
    SessionNotActive(String),

    #[error("No live refresh secret for identity {0}")]
    NoLiveRefresh(String),

    #[error("Refresh secret does not match the live record")]
    InvalidRefresh,

    #[error("Refresh secret expired at {0}")]
    RefreshExpired(DateTime<Utc>),

    #[error("Identity is not elevated")]
    NotElevated,

    // Infrastructure errors
    #[error("Could not generate a unique refresh secret after {0} attempts")]
    RefreshGenerationFailed(usize),

    #[error("Hashing error: {0}")]
    Password(#[from] auth::PasswordError),

    #[error("Token signing error: {0}")]
    Token(#[from] auth::JwtError),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Store operation timed out: {0}")]
    Timeout(String),
}

impl AuthError {
    pub fn class(&self) -> ErrorClass {
        match self {
            AuthError::InvalidIdentityId(_)
            | AuthError::InvalidLogin(_)
            | AuthError::InvalidPassword(_) => ErrorClass::Validation,
            AuthError::LoginTaken(_) => ErrorClass::Conflict,
            AuthError::LoginNotFound(_) | AuthError::PasswordIncorrect => {
                ErrorClass::Authentication
            }
            AuthError::InvalidToken
            | AuthError::SessionNotActive(_)
            | AuthError::NoLiveRefresh(_)
            | AuthError::InvalidRefresh
            | AuthError::RefreshExpired(_) => ErrorClass::Authorization,
            AuthError::NotElevated => ErrorClass::Privilege,
            AuthError::RefreshGenerationFailed(_)
            | AuthError::Password(_)
            | AuthError::Token(_)
            | AuthError::DatabaseError(_)
            | AuthError::Timeout(_) => ErrorClass::Infrastructure,
        }
    }
}
