#![allow(dead_code)]

use std::sync::Arc;

use auth::AccessClaims;
use auth::JwtHandler;
use reqwest::StatusCode;
use serde_json::json;
use serde_json::Value;
use session_service::app::assemble;
use session_service::config::Config;
use session_service::config::DatabaseConfig;
use session_service::config::JwtConfig;
use session_service::config::RefreshConfig;
use session_service::config::ServerConfig;
use session_service::config::StorageBackend;
use session_service::config::StoreConfig;
use session_service::domain::identity::models::IdentityId;
use session_service::domain::refresh::models::RefreshRecord;
use session_service::inbound::http::router::create_router;
use session_service::outbound::repositories::InMemoryIdentityRepository;
use session_service::outbound::repositories::InMemoryRefreshRepository;
use session_service::outbound::repositories::InMemorySessionRepository;

pub const JWT_SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const INTERNAL_API_KEY: &str = "test-internal-api-key";

/// Test application that spawns a real server on in-memory stores
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub jwt_handler: JwtHandler,
    pub refresh_records: Arc<InMemoryRefreshRepository>,
}

/// Access token and refresh secret as returned by the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub access_token: String,
    pub refresh_token: String,
}

impl Pair {
    pub fn from_body(body: &Value) -> Self {
        Self {
            access_token: body["data"]["access_token"]
                .as_str()
                .expect("Missing access_token")
                .to_string(),
            refresh_token: body["data"]["refresh_token"]
                .as_str()
                .expect("Missing refresh_token")
                .to_string(),
        }
    }
}

pub fn test_config(port: u16, refresh_ttl_hours: i64) -> Config {
    Config {
        server: ServerConfig {
            http_port: port,
            internal_api_key: INTERNAL_API_KEY.to_string(),
        },
        database: DatabaseConfig {
            backend: StorageBackend::Memory,
            url: String::new(),
            max_connections: 5,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            access_ttl_minutes: 15,
        },
        refresh: RefreshConfig {
            ttl_hours: refresh_ttl_hours,
            sweep_interval_seconds: 300,
        },
        store: StoreConfig { timeout_ms: 3000 },
    }
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_with_refresh_ttl_hours(72).await
    }

    /// Spawn with a custom refresh TTL. A negative TTL issues already-expired secrets.
    pub async fn spawn_with_refresh_ttl_hours(refresh_ttl_hours: i64) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let config = test_config(port, refresh_ttl_hours);
        let refresh_records = Arc::new(InMemoryRefreshRepository::new());

        let services = assemble(
            &config,
            Arc::new(InMemoryIdentityRepository::new()),
            Arc::new(InMemorySessionRepository::new()),
            Arc::clone(&refresh_records),
        );

        let router = create_router(services.auth_service, &config.server.internal_api_key);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::new(),
            jwt_handler: JwtHandler::new(JWT_SECRET.as_bytes()),
            refresh_records,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Helper to make POST request carrying the internal API key
    pub fn post_internal(&self, path: &str) -> reqwest::RequestBuilder {
        self.post(path).header("x-internal-api-key", INTERNAL_API_KEY)
    }

    /// Register an identity and return its identifier
    pub async fn register(&self, login: &str, password: &str) -> String {
        let response = self
            .post("/api/auth/register")
            .json(&json!({ "login": login, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::CREATED);

        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"]["identity_id"]
            .as_str()
            .expect("Missing identity_id")
            .to_string()
    }

    /// Issue a token pair through the internal endpoint
    pub async fn authorize(&self, identity_id: &str, elevated: bool) -> Pair {
        let response = self
            .post_internal("/api/internal/authorize")
            .json(&json!({ "identity_id": identity_id, "elevated": elevated }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = response.json().await.expect("Failed to parse response");
        Pair::from_body(&body)
    }

    /// Register an identity and issue its first token pair
    pub async fn sign_up(&self, login: &str, password: &str) -> (String, Pair) {
        let identity_id = self.register(login, password).await;
        let pair = self.authorize(&identity_id, false).await;
        (identity_id, pair)
    }

    /// Present a token pair for rotation
    pub async fn refresh(&self, pair: &Pair) -> reqwest::Response {
        self.post("/api/auth/refresh")
            .json(&json!({
                "access_token": pair.access_token,
                "refresh_token": pair.refresh_token,
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Every refresh record stored for an identity, retired ones included
    pub async fn stored_refresh_records(&self, identity_id: &str) -> Vec<RefreshRecord> {
        let identity_id = IdentityId::from_string(identity_id).expect("Invalid identity id");
        self.refresh_records.records_for(&identity_id).await
    }

    /// Number of live refresh records stored for an identity
    pub async fn live_refresh_records(&self, identity_id: &str) -> usize {
        self.stored_refresh_records(identity_id)
            .await
            .iter()
            .filter(|record| record.live)
            .count()
    }

    /// Sign an access token that expired an hour ago
    pub fn expired_access_token(&self, identity_id: &str, elevated: bool) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = AccessClaims::new(identity_id, elevated, chrono::Duration::minutes(15))
            .with_window(now - 7200, now - 3600);
        self.jwt_handler
            .encode(&claims)
            .expect("Failed to sign token")
    }
}
