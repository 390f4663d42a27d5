use std::sync::Arc;

use crate::config::Config;
use crate::domain::identity::ports::IdentityRepository;
use crate::domain::identity::service::CredentialStore;
use crate::domain::refresh::ports::RefreshRepository;
use crate::domain::refresh::service::RefreshSecretStore;
use crate::domain::rotation::ports::AuthServicePort;
use crate::domain::rotation::service::TokenRotationCoordinator;
use crate::domain::session::ports::SessionRepository;
use crate::domain::session::service::SessionRegistry;
use crate::domain::token::service::TokenIssuer;

/// Domain services wired onto one set of stores.
pub struct Services<RR>
where
    RR: RefreshRepository,
{
    pub auth_service: Arc<dyn AuthServicePort>,
    pub refresh_store: Arc<RefreshSecretStore<RR>>,
}

/// Build every domain component from configuration and the chosen store adapters.
pub fn assemble<IR, SR, RR>(
    config: &Config,
    identities: Arc<IR>,
    sessions: Arc<SR>,
    refresh_records: Arc<RR>,
) -> Services<RR>
where
    IR: IdentityRepository,
    SR: SessionRepository,
    RR: RefreshRepository,
{
    let store_timeout = config.store_timeout();

    let credentials = CredentialStore::new(identities, store_timeout);
    let sessions = Arc::new(SessionRegistry::new(sessions, store_timeout));
    let tokens = TokenIssuer::new(
        config.jwt.secret.as_bytes(),
        config.access_ttl(),
        Arc::clone(&sessions),
    );
    let refresh_store = Arc::new(RefreshSecretStore::new(
        refresh_records,
        config.refresh_ttl(),
        store_timeout,
    ));

    let auth_service: Arc<dyn AuthServicePort> = Arc::new(TokenRotationCoordinator::new(
        credentials,
        sessions,
        tokens,
        Arc::clone(&refresh_store),
    ));

    Services {
        auth_service,
        refresh_store,
    }
}
