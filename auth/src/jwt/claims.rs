use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Claim set carried by every access token.
///
/// The four fields downstream services rely on are `sub`, `elevated`, `iat` and `exp`.
/// `jti` only makes two tokens minted in the same second distinguishable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    /// Identity identifier
    pub sub: String,

    /// Elevated-privilege flag
    pub elevated: bool,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Unique token identifier
    pub jti: String,
}

impl AccessClaims {
    /// Create claims issued now and expiring after `ttl`.
    ///
    /// # Arguments
    /// * `subject` - Identity identifier
    /// * `elevated` - Elevated-privilege flag
    /// * `ttl` - Lifetime of the token
    pub fn new(subject: impl ToString, elevated: bool, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: subject.to_string(),
            elevated,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Override the issued-at and expiration timestamps.
    pub fn with_window(mut self, iat: i64, exp: i64) -> Self {
        self.iat = iat;
        self.exp = exp;
        self
    }
}
