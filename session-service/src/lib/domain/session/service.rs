use std::sync::Arc;
use std::time::Duration;

use crate::domain::deadline::bounded;
use crate::domain::errors::AuthError;
use crate::domain::identity::models::IdentityId;
use crate::domain::session::ports::SessionRepository;

/// Session registry: the per-identity active flag gating refresh and identity checks.
pub struct SessionRegistry<SR>
where
    SR: SessionRepository,
{
    repository: Arc<SR>,
    store_timeout: Duration,
}

impl<SR> SessionRegistry<SR>
where
    SR: SessionRepository,
{
    pub fn new(repository: Arc<SR>, store_timeout: Duration) -> Self {
        Self {
            repository,
            store_timeout,
        }
    }

    /// Mark the identity's session active, creating it on first use.
    pub async fn activate(&self, identity_id: &IdentityId) -> Result<(), AuthError> {
        bounded(
            self.store_timeout,
            "session.activate",
            self.repository.activate(identity_id),
        )
        .await?;

        tracing::debug!(identity_id = %identity_id, "Session activated");
        Ok(())
    }

    /// Require an active session.
    ///
    /// # Errors
    /// * `SessionNotActive` - No session row, or the session was deactivated
    /// * `DatabaseError` / `Timeout` - Store failure
    pub async fn ensure_active(&self, identity_id: &IdentityId) -> Result<(), AuthError> {
        let session = bounded(
            self.store_timeout,
            "session.find",
            self.repository.find(identity_id),
        )
        .await?;

        match session {
            Some(session) if session.active => Ok(()),
            _ => Err(AuthError::SessionNotActive(identity_id.to_string())),
        }
    }

    /// Mark the identity's session inactive. Succeeds when already inactive or absent.
    pub async fn deactivate(&self, identity_id: &IdentityId) -> Result<(), AuthError> {
        bounded(
            self.store_timeout,
            "session.deactivate",
            self.repository.deactivate(identity_id),
        )
        .await?;

        tracing::debug!(identity_id = %identity_id, "Session deactivated");
        Ok(())
    }
}
