use auth::AccessClaims;

use crate::domain::errors::AuthError;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::refresh::models::RefreshSecret;

/// Identity and privilege recovered from, or carried into, an access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub identity_id: IdentityId,
    pub elevated: bool,
}

impl Principal {
    pub fn new(identity_id: IdentityId, elevated: bool) -> Self {
        Self {
            identity_id,
            elevated,
        }
    }
}

impl From<&Identity> for Principal {
    fn from(identity: &Identity) -> Self {
        Self::new(identity.id, identity.elevated)
    }
}

impl TryFrom<AccessClaims> for Principal {
    type Error = AuthError;

    fn try_from(claims: AccessClaims) -> Result<Self, Self::Error> {
        let identity_id = IdentityId::from_string(&claims.sub)?;
        Ok(Self::new(identity_id, claims.elevated))
    }
}

/// Freshly minted access token and refresh secret.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_secret: RefreshSecret,
}
