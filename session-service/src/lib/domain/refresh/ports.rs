use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::AuthError;
use crate::domain::identity::models::IdentityId;
use crate::domain::refresh::models::RefreshRecord;

/// Persistence operations for refresh records.
#[async_trait]
pub trait RefreshRepository: Send + Sync + 'static {
    /// Check whether any stored record, for any identity, carries this hash.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn hash_exists(&self, secret_hash: &str) -> Result<bool, AuthError>;

    /// Retire the identity's live record, if any, and insert `record` as the new live one.
    ///
    /// Both writes happen atomically with respect to concurrent calls for the same
    /// identity: afterwards exactly one live record exists for it.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed (nothing is written)
    async fn replace_live(&self, record: RefreshRecord) -> Result<(), AuthError>;

    /// Retrieve the live record for an identity.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_live(&self, identity_id: &IdentityId) -> Result<Option<RefreshRecord>, AuthError>;

    /// Retire a specific record, only if it is still live (conditional update).
    ///
    /// # Returns
    /// True if this call retired it; false if it was already retired
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn retire(&self, record_id: &Uuid) -> Result<bool, AuthError>;

    /// Retire the identity's live record, if any.
    ///
    /// # Returns
    /// Number of records retired (0 or 1)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn retire_for_identity(&self, identity_id: &IdentityId) -> Result<u64, AuthError>;

    /// Retire every live record whose expiry lies before `now`.
    ///
    /// # Returns
    /// Number of records retired
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn retire_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError>;
}
