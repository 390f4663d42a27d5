use std::sync::Arc;

use clap::Parser;
use clap::Subcommand;
use session_service::app::assemble;
use session_service::config::Config;
use session_service::config::StorageBackend;
use session_service::domain::identity::models::Login;
use session_service::domain::identity::ports::IdentityRepository;
use session_service::domain::refresh::ports::RefreshRepository;
use session_service::domain::session::ports::SessionRepository;
use session_service::inbound::http::router::create_router;
use session_service::outbound::repositories::InMemoryIdentityRepository;
use session_service::outbound::repositories::InMemoryRefreshRepository;
use session_service::outbound::repositories::InMemorySessionRepository;
use session_service::outbound::repositories::PostgresIdentityRepository;
use session_service::outbound::repositories::PostgresRefreshRepository;
use session_service::outbound::repositories::PostgresSessionRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "session-service", version, about = "Session and token lifecycle service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Grant the elevated flag to an existing identity
    Promote { login: String },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "session-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;
    let command = cli.command.unwrap_or(Command::Serve);

    tracing::info!(
        backend = ?config.database.backend,
        http_port = config.server.http_port,
        access_ttl_minutes = config.jwt.access_ttl_minutes,
        refresh_ttl_hours = config.refresh.ttl_hours,
        store_timeout_ms = config.store.timeout_ms,
        "Configuration loaded"
    );

    match config.database.backend {
        StorageBackend::Postgres => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .acquire_timeout(config.store_timeout())
                .connect(&config.database.url)
                .await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            run(
                config,
                command,
                Arc::new(PostgresIdentityRepository::new(pg_pool.clone())),
                Arc::new(PostgresSessionRepository::new(pg_pool.clone())),
                Arc::new(PostgresRefreshRepository::new(pg_pool)),
            )
            .await
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory stores; all state is lost on shutdown");

            run(
                config,
                command,
                Arc::new(InMemoryIdentityRepository::new()),
                Arc::new(InMemorySessionRepository::new()),
                Arc::new(InMemoryRefreshRepository::new()),
            )
            .await
        }
    }
}

async fn run<IR, SR, RR>(
    config: Config,
    command: Command,
    identities: Arc<IR>,
    sessions: Arc<SR>,
    refresh_records: Arc<RR>,
) -> Result<(), anyhow::Error>
where
    IR: IdentityRepository,
    SR: SessionRepository,
    RR: RefreshRepository,
{
    let services = assemble(&config, identities, sessions, refresh_records);

    match command {
        Command::Promote { login } => {
            let login = Login::new(login)?;
            let identity_id = services.auth_service.promote_to_elevated(&login).await?;
            tracing::info!(login = %login, identity_id = %identity_id, "Identity promoted");
            Ok(())
        }
        Command::Serve => {
            let sweeper = Arc::clone(&services.refresh_store).spawn_sweeper(config.sweep_interval());
            tracing::info!(
                interval_seconds = config.refresh.sweep_interval_seconds,
                "Expired refresh sweeper started"
            );

            let http_address = format!("0.0.0.0:{}", config.server.http_port);
            let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
            tracing::info!(
                address = %http_address,
                port = config.server.http_port,
                protocol = "http",
                "Http server listening"
            );

            let http_application =
                create_router(services.auth_service, &config.server.internal_api_key);
            axum::serve(http_listener, http_application)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            sweeper.abort();
            tracing::info!("Server exited successfully");
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
