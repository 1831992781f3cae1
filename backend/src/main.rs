//! POS Backend
//!
//! Merchant-scoped user management: login, bearer tokens and user
//! administration over HTTP.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! - Routes: HTTP request handling and routing
//! - Services: Business logic
//! - Repositories: Data access behind store traits
//! - Database: PostgreSQL with SQLx

use anyhow::Result;
use clap::Parser;
use pos_backend::{
    cli::{self, Cli, Command},
    config, db, routes,
    state::AppState,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        command = ?cli.command(),
        "Starting POS backend"
    );

    // Validate production configuration
    if config::AppConfig::is_production() {
        validate_production_config(&config)?;
    }

    // Create database pool
    info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database.url, config.database.max_connections).await?;

    match cli.command().clone() {
        Command::Migrate => {
            db::run_migrations(&db_pool).await?;
        }
        Command::Bootstrap(args) => {
            db::run_migrations(&db_pool).await?;
            let state = AppState::new(db_pool, config);
            let outcome = cli::bootstrap(&state, args).await?;
            info!(
                merchant_id = outcome.merchant_id,
                user_id = outcome.user_id,
                "First user created"
            );
        }
        Command::Serve => {
            // Run migrations (skip in production if using separate migration job)
            if !config::AppConfig::is_production() {
                db::run_migrations(&db_pool).await?;
            }
            serve(AppState::new(db_pool, config)).await?;
        }
    }

    Ok(())
}

async fn serve(state: AppState) -> Result<()> {
    let addr = format!("{}:{}", state.config().server.host, state.config().server.port);
    let shutdown = state.shutdown_token().clone();

    // Build application
    let app = routes::create_router(state);

    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "pos_backend=info,tower_http=info".into()
        } else {
            "pos_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Validate configuration for production deployment
fn validate_production_config(config: &config::AppConfig) -> Result<()> {
    // Check database URL is not localhost in production
    if config.database.url.contains("localhost") || config.database.url.contains("127.0.0.1") {
        warn!("Database URL contains localhost - ensure this is intentional for production");
    }

    let errors = config.production_errors();
    if !errors.is_empty() {
        for err in &errors {
            error!("Configuration error: {}", err);
        }
        anyhow::bail!("Invalid production configuration");
    }

    Ok(())
}

/// Graceful shutdown signal handler
///
/// Cancels `shutdown` so in-flight hashing and store calls abort while
/// the server drains connections.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }

    shutdown.cancel();
}
