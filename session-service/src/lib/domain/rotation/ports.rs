use async_trait::async_trait;

use crate::domain::errors::AuthError;
use crate::domain::identity::models::Credentials;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::Login;
use crate::domain::identity::models::RegisterCommand;
use crate::domain::token::models::Principal;
use crate::domain::token::models::TokenPair;

/// Port for session and token lifecycle operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new identity.
    ///
    /// # Arguments
    /// * `command` - Validated command containing login and password
    ///
    /// # Returns
    /// Principal of the new identity (never elevated)
    ///
    /// # Errors
    /// * `LoginTaken` - Login already exists
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterCommand) -> Result<Principal, AuthError>;

    /// Verify a login/password pair.
    ///
    /// # Returns
    /// Principal of the matched identity
    ///
    /// # Errors
    /// * `LoginNotFound` - No identity has this login
    /// * `PasswordIncorrect` - Password does not match
    async fn login(&self, credentials: Credentials) -> Result<Principal, AuthError>;

    /// Issue an access token and a new live refresh secret for an authenticated principal.
    ///
    /// Any previous live refresh secret of the identity is retired.
    ///
    /// # Errors
    /// * `RefreshGenerationFailed` - No collision-free secret could be generated
    /// * `DatabaseError` / `Timeout` - Store failure
    async fn authorize(&self, principal: Principal) -> Result<TokenPair, AuthError>;

    /// Rotate a token pair.
    ///
    /// The access token may be past its expiry; its signature must still be valid.
    ///
    /// # Errors
    /// * `InvalidToken` - Access token signature or format is invalid
    /// * `SessionNotActive` - The identity logged out
    /// * `NoLiveRefresh` / `InvalidRefresh` / `RefreshExpired` - Refresh secret unusable
    async fn refresh(&self, access_token: &str, refresh_secret: &str) -> Result<TokenPair, AuthError>;

    /// Deactivate the session of the token's identity and retire its live refresh secret.
    /// Repeated logouts succeed.
    ///
    /// # Errors
    /// * `InvalidToken` - Access token signature or format is invalid
    async fn logout(&self, access_token: &str) -> Result<(), AuthError>;

    /// Report the identity behind a valid access token with an active session.
    ///
    /// # Errors
    /// * `InvalidToken` - Access token invalid or expired
    /// * `SessionNotActive` - The identity logged out
    async fn check_identity(&self, access_token: &str) -> Result<Principal, AuthError>;

    /// As [`Self::check_identity`], additionally requiring the elevated flag.
    ///
    /// # Errors
    /// * `NotElevated` - Token is valid but carries no elevated privilege
    async fn check_elevated(&self, access_token: &str) -> Result<Principal, AuthError>;

    /// Raise the elevated flag of an identity. Idempotent.
    ///
    /// # Errors
    /// * `LoginNotFound` - No identity has this login
    async fn promote_to_elevated(&self, login: &Login) -> Result<IdentityId, AuthError>;
}
