use std::sync::Arc;

use auth::AccessClaims;
use auth::JwtError;
use auth::JwtHandler;

use crate::domain::errors::AuthError;
use crate::domain::session::ports::SessionRepository;
use crate::domain::session::service::SessionRegistry;
use crate::domain::token::models::Principal;

/// Access token issuer and validator.
///
/// Validation is pure and lock-free. Issuing marks the owner's session active.
pub struct TokenIssuer<SR>
where
    SR: SessionRepository,
{
    jwt_handler: JwtHandler,
    access_ttl: chrono::Duration,
    sessions: Arc<SessionRegistry<SR>>,
}

impl<SR> TokenIssuer<SR>
where
    SR: SessionRepository,
{
    /// Create a new token issuer.
    ///
    /// # Arguments
    /// * `secret` - Symmetric signing key shared process-wide
    /// * `access_ttl` - Lifetime of each access token
    /// * `sessions` - Registry activated on every issuance
    pub fn new(secret: &[u8], access_ttl: chrono::Duration, sessions: Arc<SessionRegistry<SR>>) -> Self {
        Self {
            jwt_handler: JwtHandler::new(secret),
            access_ttl,
            sessions,
        }
    }

    /// Sign a new access token for the principal and activate its session.
    ///
    /// # Errors
    /// * `Token` - Signing failed
    /// * `DatabaseError` / `Timeout` - Session store failure
    pub async fn issue(&self, principal: &Principal) -> Result<String, AuthError> {
        let token = self.sign(principal)?;
        self.sessions.activate(&principal.identity_id).await?;

        Ok(token)
    }

    /// Sign a new access token without touching the session.
    ///
    /// Rotation uses this: the session must already be active, and a rotation racing a logout
    /// must not reopen it.
    pub fn sign(&self, principal: &Principal) -> Result<String, AuthError> {
        let claims = AccessClaims::new(principal.identity_id, principal.elevated, self.access_ttl);
        Ok(self.jwt_handler.encode(&claims)?)
    }

    /// Verify signature and expiry.
    ///
    /// # Errors
    /// * `InvalidToken` - Any signature, format or expiry failure
    pub fn validate(&self, token: &str) -> Result<Principal, AuthError> {
        Self::into_principal(self.jwt_handler.decode::<AccessClaims>(token))
    }

    /// Verify the signature only, accepting tokens past their expiry.
    ///
    /// Only for recovering the identity on refresh and logout.
    ///
    /// # Errors
    /// * `InvalidToken` - Any signature or format failure
    pub fn validate_signature(&self, token: &str) -> Result<Principal, AuthError> {
        Self::into_principal(self.jwt_handler.decode_allow_expired::<AccessClaims>(token))
    }

    fn into_principal(decoded: Result<AccessClaims, JwtError>) -> Result<Principal, AuthError> {
        let claims = decoded.map_err(|e| {
            tracing::debug!(reason = %e, "Access token rejected");
            AuthError::InvalidToken
        })?;

        Principal::try_from(claims).map_err(|e| {
            tracing::debug!(reason = %e, "Access token subject is not an identity ID");
            AuthError::InvalidToken
        })
    }
}
