use std::sync::Arc;
use std::time::Duration;

use auth::SecretGenerator;
use chrono::Utc;
use tokio::task::JoinHandle;

use crate::domain::crypto;
use crate::domain::deadline::bounded;
use crate::domain::errors::AuthError;
use crate::domain::identity::models::IdentityId;
use crate::domain::refresh::models::RefreshRecord;
use crate::domain::refresh::models::RefreshSecret;
use crate::domain::refresh::ports::RefreshRepository;

/// Attempts at generating a secret whose hash collides with no stored hash.
pub const MAX_ISSUE_ATTEMPTS: usize = 3;

/// Refresh secret store: issues, verifies and retires the single live secret per identity.
pub struct RefreshSecretStore<RR>
where
    RR: RefreshRepository,
{
    repository: Arc<RR>,
    generator: SecretGenerator,
    ttl: chrono::Duration,
    store_timeout: Duration,
}

impl<RR> RefreshSecretStore<RR>
where
    RR: RefreshRepository,
{
    /// Create a new refresh secret store.
    ///
    /// # Arguments
    /// * `repository` - Refresh record persistence implementation
    /// * `ttl` - Lifetime of each issued secret
    /// * `store_timeout` - Deadline applied to each repository call
    pub fn new(repository: Arc<RR>, ttl: chrono::Duration, store_timeout: Duration) -> Self {
        Self {
            repository,
            generator: SecretGenerator::new(),
            ttl,
            store_timeout,
        }
    }

    /// Issue a new live secret for the identity, retiring the previous one.
    ///
    /// # Returns
    /// The raw secret; only its hash is persisted
    ///
    /// # Errors
    /// * `RefreshGenerationFailed` - Every attempt collided with a stored hash
    /// * `Password` - Hashing failed
    /// * `DatabaseError` / `Timeout` - Store failure
    pub async fn issue(&self, identity_id: &IdentityId) -> Result<RefreshSecret, AuthError> {
        for attempt in 1..=MAX_ISSUE_ATTEMPTS {
            let secret = self.generator.generate();
            let secret_hash = crypto::hash_secret(secret.clone()).await?;

            let collides = bounded(
                self.store_timeout,
                "refresh.hash_exists",
                self.repository.hash_exists(&secret_hash),
            )
            .await?;
            if collides {
                tracing::warn!(
                    identity_id = %identity_id,
                    attempt,
                    "Refresh secret hash collides with a stored record, regenerating"
                );
                continue;
            }

            let record = RefreshRecord::new(*identity_id, secret_hash, Utc::now() + self.ttl);
            let expires_at = record.expires_at;
            bounded(
                self.store_timeout,
                "refresh.replace_live",
                self.repository.replace_live(record),
            )
            .await?;

            tracing::info!(identity_id = %identity_id, %expires_at, "Refresh secret issued");
            return Ok(RefreshSecret::new(secret));
        }

        tracing::error!(
            identity_id = %identity_id,
            attempts = MAX_ISSUE_ATTEMPTS,
            "Could not generate a collision-free refresh secret"
        );
        Err(AuthError::RefreshGenerationFailed(MAX_ISSUE_ATTEMPTS))
    }

    /// Check a presented secret against the identity's live record.
    ///
    /// # Returns
    /// The matched live record
    ///
    /// # Errors
    /// * `NoLiveRefresh` - The identity has no live record
    /// * `InvalidRefresh` - Secret does not match the live record
    /// * `RefreshExpired` - Secret matches but the record is past its expiry
    /// * `DatabaseError` / `Timeout` - Store failure
    pub async fn verify(
        &self,
        identity_id: &IdentityId,
        presented: &str,
    ) -> Result<RefreshRecord, AuthError> {
        let record = bounded(
            self.store_timeout,
            "refresh.find_live",
            self.repository.find_live(identity_id),
        )
        .await?
        .ok_or_else(|| AuthError::NoLiveRefresh(identity_id.to_string()))?;

        let matches =
            crypto::verify_secret(presented.to_string(), record.secret_hash.clone()).await?;
        if !matches {
            return Err(AuthError::InvalidRefresh);
        }

        if record.is_expired(Utc::now()) {
            return Err(AuthError::RefreshExpired(record.expires_at));
        }

        Ok(record)
    }

    /// Retire a verified record so it can never be presented again.
    ///
    /// # Errors
    /// * `InvalidRefresh` - Another request retired the record first
    /// * `DatabaseError` / `Timeout` - Store failure
    pub async fn consume(&self, record: &RefreshRecord) -> Result<(), AuthError> {
        let retired = bounded(
            self.store_timeout,
            "refresh.retire",
            self.repository.retire(&record.id),
        )
        .await?;

        if !retired {
            tracing::warn!(
                identity_id = %record.identity_id,
                "Refresh record was retired by a concurrent request"
            );
            return Err(AuthError::InvalidRefresh);
        }

        Ok(())
    }

    /// Retire the identity's live secret, forcing re-authentication.
    pub async fn invalidate(&self, identity_id: &IdentityId) -> Result<(), AuthError> {
        let retired = bounded(
            self.store_timeout,
            "refresh.retire_for_identity",
            self.repository.retire_for_identity(identity_id),
        )
        .await?;

        tracing::debug!(identity_id = %identity_id, retired, "Refresh secret invalidated");
        Ok(())
    }

    /// Retire every live record that is past its expiry.
    pub async fn sweep_expired(&self) -> Result<u64, AuthError> {
        bounded(
            self.store_timeout,
            "refresh.retire_expired",
            self.repository.retire_expired(Utc::now()),
        )
        .await
    }

    /// Run [`Self::sweep_expired`] periodically in the background.
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                match self.sweep_expired().await {
                    Ok(0) => {}
                    Ok(retired) => tracing::info!(retired, "Expired refresh records retired"),
                    Err(e) => tracing::error!(error = %e, "Refresh sweep failed"),
                }
            }
        })
    }
}
