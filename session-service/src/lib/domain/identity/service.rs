use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::domain::crypto;
use crate::domain::deadline::bounded;
use crate::domain::errors::AuthError;
use crate::domain::identity::models::Credentials;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::Login;
use crate::domain::identity::models::RegisterCommand;
use crate::domain::identity::ports::IdentityRepository;

/// Credential store: account creation, password verification and promotion.
pub struct CredentialStore<IR>
where
    IR: IdentityRepository,
{
    repository: Arc<IR>,
    store_timeout: Duration,
}

impl<IR> CredentialStore<IR>
where
    IR: IdentityRepository,
{
    /// Create a new credential store.
    ///
    /// # Arguments
    /// * `repository` - Identity persistence implementation
    /// * `store_timeout` - Deadline applied to each repository call
    pub fn new(repository: Arc<IR>, store_timeout: Duration) -> Self {
        Self {
            repository,
            store_timeout,
        }
    }

    /// Register a new identity with a hashed password.
    ///
    /// # Errors
    /// * `LoginTaken` - Login already exists
    /// * `Password` - Hashing failed
    /// * `DatabaseError` / `Timeout` - Store failure
    pub async fn create_identity(&self, command: RegisterCommand) -> Result<Identity, AuthError> {
        let password_hash = crypto::hash_secret(command.password.expose().to_string()).await?;

        let identity = Identity {
            id: IdentityId::new(),
            login: command.login,
            password_hash,
            elevated: false,
            created_at: Utc::now(),
        };

        let created = bounded(
            self.store_timeout,
            "identity.create",
            self.repository.create(identity),
        )
        .await?;

        tracing::info!(identity_id = %created.id, login = %created.login, "Identity registered");
        Ok(created)
    }

    /// Check a login/password pair.
    ///
    /// # Errors
    /// * `LoginNotFound` - No identity has this login
    /// * `PasswordIncorrect` - Password does not match
    /// * `Password` - Stored hash is unreadable
    /// * `DatabaseError` / `Timeout` - Store failure
    pub async fn verify_credentials(&self, credentials: Credentials) -> Result<Identity, AuthError> {
        let identity = bounded(
            self.store_timeout,
            "identity.find_by_login",
            self.repository.find_by_login(&credentials.login),
        )
        .await?
        .ok_or_else(|| AuthError::LoginNotFound(credentials.login.clone()))?;

        let matches =
            crypto::verify_secret(credentials.password, identity.password_hash.clone()).await?;
        if !matches {
            return Err(AuthError::PasswordIncorrect);
        }

        Ok(identity)
    }

    /// Raise the elevated flag. Idempotent.
    ///
    /// # Errors
    /// * `LoginNotFound` - No identity has this login
    /// * `DatabaseError` / `Timeout` - Store failure
    pub async fn promote_to_elevated(&self, login: &Login) -> Result<IdentityId, AuthError> {
        let id = bounded(
            self.store_timeout,
            "identity.set_elevated",
            self.repository.set_elevated(login),
        )
        .await?
        .ok_or_else(|| AuthError::LoginNotFound(login.to_string()))?;

        tracing::info!(identity_id = %id, login = %login, "Identity promoted to elevated");
        Ok(id)
    }
}
