use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::AuthError;
use crate::domain::errors::ErrorClass;
use crate::domain::identity::models::Credentials;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::Login;
use crate::domain::identity::models::RegisterCommand;
use crate::domain::identity::ports::IdentityRepository;
use crate::domain::identity::service::CredentialStore;
use crate::domain::refresh::ports::RefreshRepository;
use crate::domain::refresh::service::RefreshSecretStore;
use crate::domain::rotation::ports::AuthServicePort;
use crate::domain::session::ports::SessionRepository;
use crate::domain::session::service::SessionRegistry;
use crate::domain::token::models::Principal;
use crate::domain::token::models::TokenPair;
use crate::domain::token::service::TokenIssuer;

/// Token rotation coordinator.
///
/// Stateless between calls: everything durable lives in the three stores.
pub struct TokenRotationCoordinator<IR, SR, RR>
where
    IR: IdentityRepository,
    SR: SessionRepository,
    RR: RefreshRepository,
{
    credentials: CredentialStore<IR>,
    sessions: Arc<SessionRegistry<SR>>,
    tokens: TokenIssuer<SR>,
    refresh: Arc<RefreshSecretStore<RR>>,
}

impl<IR, SR, RR> TokenRotationCoordinator<IR, SR, RR>
where
    IR: IdentityRepository,
    SR: SessionRepository,
    RR: RefreshRepository,
{
    pub fn new(
        credentials: CredentialStore<IR>,
        sessions: Arc<SessionRegistry<SR>>,
        tokens: TokenIssuer<SR>,
        refresh: Arc<RefreshSecretStore<RR>>,
    ) -> Self {
        Self {
            credentials,
            sessions,
            tokens,
            refresh,
        }
    }

    async fn issue_pair(&self, principal: &Principal) -> Result<TokenPair, AuthError> {
        let access_token = self.tokens.issue(principal).await?;
        let refresh_secret = self.refresh.issue(&principal.identity_id).await?;

        Ok(TokenPair {
            access_token,
            refresh_secret,
        })
    }

    async fn rotate(&self, access_token: &str, refresh_secret: &str) -> Result<TokenPair, AuthError> {
        let principal = self.tokens.validate_signature(access_token)?;
        let identity_id = principal.identity_id;

        self.sessions.ensure_active(&identity_id).await?;
        let record = self.refresh.verify(&identity_id, refresh_secret).await?;
        self.refresh.consume(&record).await?;

        let access_token = self.tokens.sign(&principal)?;
        let refresh_secret = self.refresh.issue(&identity_id).await?;

        // A logout that landed after the first check has deactivated the session but may have
        // run before the new secret was stored.
        if let Err(e) = self.sessions.ensure_active(&identity_id).await {
            self.refresh.invalidate(&identity_id).await?;
            return Err(e);
        }

        tracing::info!(identity_id = %identity_id, "Token pair rotated");
        Ok(TokenPair {
            access_token,
            refresh_secret,
        })
    }
}

fn log_rejection(operation: &'static str, error: &AuthError) {
    match error.class() {
        ErrorClass::Infrastructure => {
            tracing::error!(operation, error = %error, "Session operation failed")
        }
        _ => tracing::warn!(operation, reason = %error, "Session operation rejected"),
    }
}

#[async_trait]
impl<IR, SR, RR> AuthServicePort for TokenRotationCoordinator<IR, SR, RR>
where
    IR: IdentityRepository,
    SR: SessionRepository,
    RR: RefreshRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<Principal, AuthError> {
        let identity = self.credentials.create_identity(command).await?;
        Ok(Principal::from(&identity))
    }

    async fn login(&self, credentials: Credentials) -> Result<Principal, AuthError> {
        let identity = self
            .credentials
            .verify_credentials(credentials)
            .await
            .inspect_err(|e| log_rejection("login", e))?;

        tracing::info!(identity_id = %identity.id, "Credentials verified");
        Ok(Principal::from(&identity))
    }

    async fn authorize(&self, principal: Principal) -> Result<TokenPair, AuthError> {
        let pair = self
            .issue_pair(&principal)
            .await
            .inspect_err(|e| log_rejection("authorize", e))?;

        tracing::info!(
            identity_id = %principal.identity_id,
            elevated = principal.elevated,
            "Token pair issued"
        );
        Ok(pair)
    }

    async fn refresh(&self, access_token: &str, refresh_secret: &str) -> Result<TokenPair, AuthError> {
        self.rotate(access_token, refresh_secret)
            .await
            .inspect_err(|e| log_rejection("refresh", e))
    }

    async fn logout(&self, access_token: &str) -> Result<(), AuthError> {
        let principal = self
            .tokens
            .validate_signature(access_token)
            .inspect_err(|e| log_rejection("logout", e))?;

        self.sessions.deactivate(&principal.identity_id).await?;
        self.refresh.invalidate(&principal.identity_id).await?;

        tracing::info!(identity_id = %principal.identity_id, "Session closed");
        Ok(())
    }

    async fn check_identity(&self, access_token: &str) -> Result<Principal, AuthError> {
        let principal = self.tokens.validate(access_token)?;
        self.sessions.ensure_active(&principal.identity_id).await?;
        Ok(principal)
    }

    async fn check_elevated(&self, access_token: &str) -> Result<Principal, AuthError> {
        let principal = self.check_identity(access_token).await?;

        if !principal.elevated {
            return Err(AuthError::NotElevated);
        }
        Ok(principal)
    }

    async fn promote_to_elevated(&self, login: &Login) -> Result<IdentityId, AuthError> {
        self.credentials.promote_to_elevated(login).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use auth::AccessClaims;
    use auth::JwtHandler;
    use chrono::DateTime;
    use chrono::Utc;
    use tokio::sync::Notify;
    use uuid::Uuid;

    use super::*;
    use crate::domain::identity::models::Password;
    use crate::domain::refresh::models::RefreshRecord;
    use crate::outbound::repositories::memory::InMemoryIdentityRepository;
    use crate::outbound::repositories::memory::InMemoryRefreshRepository;
    use crate::outbound::repositories::memory::InMemorySessionRepository;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes_long!!";

    type TestCoordinator = TokenRotationCoordinator<
        InMemoryIdentityRepository,
        InMemorySessionRepository,
        InMemoryRefreshRepository,
    >;

    struct Fixture {
        coordinator: TestCoordinator,
        refresh_records: Arc<InMemoryRefreshRepository>,
    }

    fn coordinator_over<RR: RefreshRepository>(
        refresh_records: Arc<RR>,
        refresh_ttl: chrono::Duration,
    ) -> TokenRotationCoordinator<InMemoryIdentityRepository, InMemorySessionRepository, RR> {
        let timeout = Duration::from_secs(3);

        let credentials = CredentialStore::new(Arc::new(InMemoryIdentityRepository::new()), timeout);
        let sessions = Arc::new(SessionRegistry::new(
            Arc::new(InMemorySessionRepository::new()),
            timeout,
        ));
        let tokens = TokenIssuer::new(SECRET, chrono::Duration::minutes(15), Arc::clone(&sessions));
        let refresh = Arc::new(RefreshSecretStore::new(refresh_records, refresh_ttl, timeout));

        TokenRotationCoordinator::new(credentials, sessions, tokens, refresh)
    }

    fn fixture_with_refresh_ttl(refresh_ttl: chrono::Duration) -> Fixture {
        let refresh_records = Arc::new(InMemoryRefreshRepository::new());

        Fixture {
            coordinator: coordinator_over(Arc::clone(&refresh_records), refresh_ttl),
            refresh_records,
        }
    }

    fn fixture() -> Fixture {
        fixture_with_refresh_ttl(chrono::Duration::hours(72))
    }

    fn register_command(login: &str, password: &str) -> RegisterCommand {
        RegisterCommand::new(
            Login::new(login.to_string()).unwrap(),
            Password::new(password.to_string()).unwrap(),
        )
    }

    impl Fixture {
        async fn live_count(&self, identity_id: &IdentityId) -> usize {
            self.refresh_records
                .records_for(identity_id)
                .await
                .iter()
                .filter(|r| r.live)
                .count()
        }

        async fn alice(&self) -> (Principal, TokenPair) {
            let principal = self
                .coordinator
                .register(register_command("alice", "s3cr3t!!"))
                .await
                .unwrap();
            let pair = self.coordinator.authorize(principal).await.unwrap();
            (principal, pair)
        }
    }

    #[derive(Clone, Copy, PartialEq)]
    enum Gate {
        FindLive,
        Retire,
    }

    /// In-memory refresh records that park one operation until the test releases it.
    struct GatedRefreshRepository {
        inner: InMemoryRefreshRepository,
        gate: Gate,
        reached: Notify,
        release: Notify,
    }

    impl GatedRefreshRepository {
        fn new(gate: Gate) -> Self {
            Self {
                inner: InMemoryRefreshRepository::new(),
                gate,
                reached: Notify::new(),
                release: Notify::new(),
            }
        }

        async fn hold(&self, gate: Gate) {
            if self.gate == gate {
                self.reached.notify_one();
                self.release.notified().await;
            }
        }

        async fn live_count(&self, identity_id: &IdentityId) -> usize {
            self.inner
                .records_for(identity_id)
                .await
                .iter()
                .filter(|r| r.live)
                .count()
        }
    }

    #[async_trait]
    impl RefreshRepository for GatedRefreshRepository {
        async fn hash_exists(&self, secret_hash: &str) -> Result<bool, AuthError> {
            self.inner.hash_exists(secret_hash).await
        }

        async fn replace_live(&self, record: RefreshRecord) -> Result<(), AuthError> {
            self.inner.replace_live(record).await
        }

        async fn find_live(&self, identity_id: &IdentityId) -> Result<Option<RefreshRecord>, AuthError> {
            let found = self.inner.find_live(identity_id).await;
            self.hold(Gate::FindLive).await;
            found
        }

        async fn retire(&self, record_id: &Uuid) -> Result<bool, AuthError> {
            let retired = self.inner.retire(record_id).await;
            self.hold(Gate::Retire).await;
            retired
        }

        async fn retire_for_identity(&self, identity_id: &IdentityId) -> Result<u64, AuthError> {
            self.inner.retire_for_identity(identity_id).await
        }

        async fn retire_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
            self.inner.retire_expired(now).await
        }
    }

    type GatedCoordinator = TokenRotationCoordinator<
        InMemoryIdentityRepository,
        InMemorySessionRepository,
        GatedRefreshRepository,
    >;

    /// Start a refresh, let it run up to the gate, log out, then let it finish.
    async fn refresh_racing_logout(
        gate: Gate,
    ) -> (
        Arc<GatedCoordinator>,
        Arc<GatedRefreshRepository>,
        Principal,
        TokenPair,
        Result<TokenPair, AuthError>,
    ) {
        let refresh_records = Arc::new(GatedRefreshRepository::new(gate));
        let coordinator = Arc::new(coordinator_over(
            Arc::clone(&refresh_records),
            chrono::Duration::hours(72),
        ));

        let principal = coordinator
            .register(register_command("alice", "s3cr3t!!"))
            .await
            .unwrap();
        let pair = coordinator.authorize(principal).await.unwrap();

        let rotation = {
            let coordinator = Arc::clone(&coordinator);
            let pair = pair.clone();
            tokio::spawn(async move {
                coordinator
                    .refresh(&pair.access_token, pair.refresh_secret.expose())
                    .await
            })
        };

        refresh_records.reached.notified().await;
        coordinator.logout(&pair.access_token).await.unwrap();
        refresh_records.release.notify_one();

        let result = rotation.await.unwrap();
        (coordinator, refresh_records, principal, pair, result)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_logout_during_verify_defeats_rotation() {
        let (coordinator, refresh_records, principal, pair, result) =
            refresh_racing_logout(Gate::FindLive).await;

        assert!(matches!(result, Err(AuthError::InvalidRefresh)));
        assert_eq!(refresh_records.live_count(&principal.identity_id).await, 0);
        assert!(matches!(
            coordinator.check_identity(&pair.access_token).await,
            Err(AuthError::SessionNotActive(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_logout_after_consume_defeats_rotation() {
        let (coordinator, refresh_records, principal, pair, result) =
            refresh_racing_logout(Gate::Retire).await;

        assert!(matches!(result, Err(AuthError::SessionNotActive(_))));
        assert_eq!(refresh_records.live_count(&principal.identity_id).await, 0);
        assert!(matches!(
            coordinator.check_identity(&pair.access_token).await,
            Err(AuthError::SessionNotActive(_))
        ));
    }

    #[tokio::test]
    async fn test_alice_scenario() {
        let fixture = fixture();
        let (principal, pair) = fixture.alice().await;
        assert!(!principal.elevated);

        let rotated = fixture
            .coordinator
            .refresh(&pair.access_token, pair.refresh_secret.expose())
            .await
            .unwrap();
        assert_ne!(rotated.access_token, pair.access_token);
        assert_ne!(rotated.refresh_secret, pair.refresh_secret);

        let stale = fixture
            .coordinator
            .refresh(&pair.access_token, pair.refresh_secret.expose())
            .await;
        assert!(matches!(stale, Err(AuthError::InvalidRefresh)));
    }

    #[tokio::test]
    async fn test_authorize_leaves_exactly_one_live_record() {
        let fixture = fixture();
        let (principal, _) = fixture.alice().await;
        assert_eq!(fixture.live_count(&principal.identity_id).await, 1);

        fixture.coordinator.authorize(principal).await.unwrap();
        assert_eq!(fixture.live_count(&principal.identity_id).await, 1);
        assert_eq!(
            fixture.refresh_records.records_for(&principal.identity_id).await.len(),
            2
        );
    }

    #[tokio::test]
    async fn test_second_authorize_invalidates_first_secret() {
        let fixture = fixture();
        let (principal, first) = fixture.alice().await;
        let second = fixture.coordinator.authorize(principal).await.unwrap();

        let result = fixture
            .coordinator
            .refresh(&second.access_token, first.refresh_secret.expose())
            .await;
        assert!(matches!(result, Err(AuthError::InvalidRefresh)));
    }

    #[tokio::test]
    async fn test_refresh_with_expired_live_secret() {
        let fixture = fixture_with_refresh_ttl(chrono::Duration::seconds(-1));
        let (principal, pair) = fixture.alice().await;
        assert_eq!(fixture.live_count(&principal.identity_id).await, 1);

        let result = fixture
            .coordinator
            .refresh(&pair.access_token, pair.refresh_secret.expose())
            .await;
        assert!(matches!(result, Err(AuthError::RefreshExpired(_))));
    }

    #[tokio::test]
    async fn test_logout_then_refresh_is_rejected() {
        let fixture = fixture();
        let (principal, pair) = fixture.alice().await;

        fixture.coordinator.logout(&pair.access_token).await.unwrap();
        fixture.coordinator.logout(&pair.access_token).await.unwrap();

        let result = fixture
            .coordinator
            .refresh(&pair.access_token, pair.refresh_secret.expose())
            .await;
        assert!(matches!(result, Err(AuthError::SessionNotActive(_))));

        let identity = fixture.coordinator.check_identity(&pair.access_token).await;
        assert!(matches!(identity, Err(AuthError::SessionNotActive(_))));
        assert_eq!(fixture.live_count(&principal.identity_id).await, 0);
    }

    #[tokio::test]
    async fn test_refresh_accepts_expired_access_token() {
        let fixture = fixture();
        let (principal, pair) = fixture.alice().await;

        let now = chrono::Utc::now().timestamp();
        let claims = AccessClaims::new(principal.identity_id, false, chrono::Duration::minutes(15))
            .with_window(now - 7200, now - 3600);
        let expired = JwtHandler::new(SECRET).encode(&claims).unwrap();

        assert!(matches!(
            fixture.coordinator.check_identity(&expired).await,
            Err(AuthError::InvalidToken)
        ));
        assert!(fixture
            .coordinator
            .refresh(&expired, pair.refresh_secret.expose())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_refresh_with_forged_token() {
        let fixture = fixture();
        let (principal, pair) = fixture.alice().await;

        let claims = AccessClaims::new(principal.identity_id, true, chrono::Duration::minutes(15));
        let forged = JwtHandler::new(b"attacker_key_that_is_also_32_bytes!!")
            .encode(&claims)
            .unwrap();

        let result = fixture
            .coordinator
            .refresh(&forged, pair.refresh_secret.expose())
            .await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_refresh_with_another_identitys_secret() {
        let fixture = fixture();
        let (_, alice) = fixture.alice().await;
        let bob = fixture
            .coordinator
            .register(register_command("bob", "hunter2hunter2"))
            .await
            .unwrap();
        let bob_pair = fixture.coordinator.authorize(bob).await.unwrap();

        let result = fixture
            .coordinator
            .refresh(&bob_pair.access_token, alice.refresh_secret.expose())
            .await;
        assert!(matches!(result, Err(AuthError::InvalidRefresh)));
    }

    #[tokio::test]
    async fn test_login_failures() {
        let fixture = fixture();
        fixture.alice().await;

        let wrong = fixture
            .coordinator
            .login(Credentials::new("alice", "wrong"))
            .await;
        assert!(matches!(wrong, Err(AuthError::PasswordIncorrect)));

        let unknown = fixture.coordinator.login(Credentials::new("bob", "x")).await;
        assert!(matches!(unknown, Err(AuthError::LoginNotFound(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_login() {
        let fixture = fixture();
        fixture.alice().await;

        let result = fixture
            .coordinator
            .register(register_command("alice", "another-password"))
            .await;
        assert!(matches!(result, Err(AuthError::LoginTaken(_))));
    }

    #[tokio::test]
    async fn test_check_elevated_requires_flag() {
        let fixture = fixture();
        let (principal, pair) = fixture.alice().await;

        assert!(matches!(
            fixture.coordinator.check_elevated(&pair.access_token).await,
            Err(AuthError::NotElevated)
        ));

        let login = Login::new("alice".to_string()).unwrap();
        fixture.coordinator.promote_to_elevated(&login).await.unwrap();

        // Promotion shows up in tokens minted after a fresh login.
        let promoted = fixture
            .coordinator
            .login(Credentials::new("alice", "s3cr3t!!"))
            .await
            .unwrap();
        assert_eq!(promoted, Principal::new(principal.identity_id, true));
        let pair = fixture.coordinator.authorize(promoted).await.unwrap();
        assert!(fixture
            .coordinator
            .check_elevated(&pair.access_token)
            .await
            .is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_refresh_with_same_pair_mints_once() {
        let fixture = Arc::new(fixture());
        let (principal, pair) = fixture.alice().await;

        let attempts = (0..4).map(|_| {
            let fixture = Arc::clone(&fixture);
            let pair = pair.clone();
            tokio::spawn(async move {
                fixture
                    .coordinator
                    .refresh(&pair.access_token, pair.refresh_secret.expose())
                    .await
            })
        });

        let mut succeeded = 0;
        for attempt in attempts.collect::<Vec<_>>() {
            match attempt.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(e) => assert!(
                    matches!(e, AuthError::InvalidRefresh | AuthError::NoLiveRefresh(_)),
                    "{}",
                    e
                ),
            }
        }

        assert_eq!(succeeded, 1);
        assert_eq!(fixture.live_count(&principal.identity_id).await, 1);
    }
}
