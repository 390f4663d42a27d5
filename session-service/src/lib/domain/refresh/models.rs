use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::identity::models::IdentityId;

/// Stored refresh secret.
///
/// At most one record per identity is `live`. A record that is no longer live, or is past
/// `expires_at`, never becomes usable again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRecord {
    pub id: Uuid,
    pub identity_id: IdentityId,
    pub secret_hash: String,
    pub live: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl RefreshRecord {
    pub fn new(identity_id: IdentityId, secret_hash: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity_id,
            secret_hash,
            live: true,
            created_at: Utc::now(),
            expires_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Raw refresh secret handed to the client exactly once.
///
/// Only its hash is stored. `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshSecret(String);

impl RefreshSecret {
    pub fn new(secret: String) -> Self {
        Self(secret)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for RefreshSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefreshSecret(***)")
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_new_record_is_live() {
        let record = RefreshRecord::new(
            IdentityId::new(),
            "$argon2id$hash".to_string(),
            Utc::now() + Duration::hours(1),
        );

        assert!(record.live);
        assert!(!record.is_expired(Utc::now()));
    }

    #[test]
    fn test_record_expiry_boundary() {
        let expires_at = Utc::now();
        let record = RefreshRecord::new(IdentityId::new(), "$argon2id$hash".to_string(), expires_at);

        assert!(!record.is_expired(expires_at));
        assert!(record.is_expired(expires_at + Duration::seconds(1)));
    }

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let secret = RefreshSecret::new("c2VjcmV0LXNlY3JldA==".to_string());
        assert_eq!(format!("{:?}", secret), "RefreshSecret(***)");
    }
}
