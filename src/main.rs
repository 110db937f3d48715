use blog_platform::{
    AppState,
    auth::{
        AccessGate, AuthProviderClient, JwtSessionResolver, RemoteSessionResolver,
        RoleLookupState, SessionResolverState,
    },
    config::{AppConfig, Env, SessionVerification},
    create_router,
    repository::{PostgresRepository, RepositoryState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Startup order: configuration, logging, database (with migrations), auth
/// collaborators, then the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "blog_platform=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);
    if config.admin_allowlist.is_configured() {
        tracing::info!(
            admins = config.admin_allowlist.len(),
            "admin allowlist configured; /admin ignores role assignments"
        );
    }

    // 3. Database
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("FATAL: Database migrations failed.");

    // One Postgres-backed value serves both as the repository and the role lookup.
    let postgres = Arc::new(PostgresRepository::new(pool));
    let repo = postgres.clone() as RepositoryState;
    let roles = postgres as RoleLookupState;

    // 4. Auth collaborators
    let provider = AuthProviderClient::new(&config);
    let sessions: SessionResolverState = match config.session_verification {
        SessionVerification::Local => Arc::new(JwtSessionResolver::new(&config, repo.clone())),
        SessionVerification::Remote => Arc::new(RemoteSessionResolver::new(provider.clone())),
    };
    let gate = AccessGate::from_config(&config)
        .expect("FATAL: Route patterns failed to compile.");

    let bind_addr = config.bind_addr.clone();

    let app_state = AppState {
        repo,
        sessions,
        roles,
        gate,
        provider,
        config,
    };

    // 5. Router and server
    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr).await.unwrap();

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app).await.unwrap();
}
