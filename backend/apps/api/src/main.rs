//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request errors are `auth::AuthError`.

mod config;

use auth::{AuthOrchestrator, PgAuthRepository, RedisAccessTokenStore, auth_router};
use axum::{
    Router, http,
    http::{Method, header},
    routing::get,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Access-token cache; login cannot work without it
    let token_store = RedisAccessTokenStore::connect(&config.redis_url)
        .await
        .map_err(|e| anyhow::anyhow!("failed to connect to Redis: {e}"))?;

    tracing::info!("Connected to Redis");

    let verifiers = auth::registry_from_config(&config.auth)
        .map_err(|e| anyhow::anyhow!("failed to build identity verifiers: {e}"))?;

    let auth = AuthOrchestrator::new(
        PgAuthRepository::new(pool.clone()),
        token_store,
        verifiers,
        config.auth.clone(),
    );

    // Startup cleanup: remove revoked and expired refresh sessions
    // Errors here should not prevent server startup
    match auth.cleanup_spent_sessions().await {
        Ok(sessions) => {
            tracing::info!(sessions_deleted = sessions, "Refresh session cleanup completed");
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Refresh session cleanup failed, continuing anyway"
            );
        }
    }

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    // Build router
    let app = Router::new()
        .route("/api/health", get(health))
        .nest("/api/auth", auth_router(auth))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received, draining connections");
    })
    .await?;

    Ok(())
}

/// GET /api/health
async fn health() -> &'static str {
    "OK"
}
