use async_trait::async_trait;

use crate::domain::errors::AuthError;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::Login;

/// Persistence operations for identities.
#[async_trait]
pub trait IdentityRepository: Send + Sync + 'static {
    /// Persist a new identity.
    ///
    /// Login uniqueness is enforced by the store itself, atomically with the insert.
    ///
    /// # Errors
    /// * `LoginTaken` - Login is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, identity: Identity) -> Result<Identity, AuthError>;

    /// Retrieve identity by exact (case-sensitive) login.
    ///
    /// # Returns
    /// Optional identity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_login(&self, login: &str) -> Result<Option<Identity>, AuthError>;

    /// Raise the elevated flag for a login.
    ///
    /// # Returns
    /// Identifier of the promoted identity (None if no identity has this login)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn set_elevated(&self, login: &Login) -> Result<Option<IdentityId>, AuthError>;
}
