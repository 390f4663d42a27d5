use chrono::DateTime;
use chrono::Utc;

use crate::domain::identity::models::IdentityId;

/// Per-identity session flag.
///
/// Exists from the first token issuance on; never deleted, only toggled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity_id: IdentityId,
    pub active: bool,
    pub updated_at: DateTime<Utc>,
}
