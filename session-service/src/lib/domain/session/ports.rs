use async_trait::async_trait;

use crate::domain::errors::AuthError;
use crate::domain::identity::models::IdentityId;
use crate::domain::session::models::Session;

/// Persistence operations for session flags.
#[async_trait]
pub trait SessionRepository: Send + Sync + 'static {
    /// Ensure a session row exists for the identity and mark it active (upsert).
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn activate(&self, identity_id: &IdentityId) -> Result<(), AuthError>;

    /// Retrieve the session row for an identity.
    ///
    /// # Returns
    /// Optional session (None if the identity was never issued tokens)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find(&self, identity_id: &IdentityId) -> Result<Option<Session>, AuthError>;

    /// Mark the session inactive. A missing row is not an error.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn deactivate(&self, identity_id: &IdentityId) -> Result<(), AuthError>;
}
