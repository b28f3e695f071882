//! Quill Binary Entry Point
//!
//! This binary runs the blog RPC service. Core functionality is provided by
//! the `quill` library crate.

use clap::Parser;
use quill::{
    config::{AppConfig, DatabaseDriver},
    server::{AppState, create_router},
    storage::{BlogStore, MongoStore, PostgresStore},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Quill - Blog Post RPC Service
#[derive(Parser, Debug)]
#[command(name = "quill", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "configs/config.yaml",
        env = "QUILL_CONFIG"
    )]
    config: String,

    /// Server bind address (overrides config file)
    #[arg(long, env = "QUILL_SERVER_BIND")]
    server_bind: Option<String>,

    /// Server port (overrides config file)
    #[arg(long, env = "QUILL_SERVER_PORT")]
    server_port: Option<u16>,

    /// Storage backend: mongodb or postgres (overrides config file)
    #[arg(long, env = "QUILL_DB_DRIVER")]
    db_driver: Option<DatabaseDriver>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,quill=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Quill - Blog Post RPC Service");

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration from file
    tracing::info!("Loading configuration from: {}", cli.config);
    let mut config = AppConfig::load(&cli.config)?;

    // Apply CLI/env overrides (CLI > ENV > config file)
    if let Some(bind) = cli.server_bind {
        config.server.bind = bind;
    }
    if let Some(port) = cli.server_port {
        config.server.port = port;
    }
    if let Some(driver) = cli.db_driver {
        config.database.driver = driver;
    }
    config.validate()?;

    tracing::info!(
        "Server: {}:{}, Backend: {} ({}:{})",
        config.server.bind,
        config.server.port,
        config.database.driver,
        config.database.host,
        config.database.port,
    );

    // Connect the selected backend. The adapter is chosen exactly once;
    // everything downstream sees only the BlogStore contract.
    let db_url = config.database.connection_url();
    let store: Arc<dyn BlogStore> = match config.database.driver {
        DatabaseDriver::Mongodb => Arc::new(
            MongoStore::connect(
                &db_url,
                &config.database.dbname,
                &config.database.collection,
            )
            .await?,
        ),
        DatabaseDriver::Postgres => Arc::new(PostgresStore::connect(&db_url).await?),
    };

    tracing::info!("Storage initialized");

    // Build Axum router
    let app = create_router(AppState { store });

    // Parse bind address
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;

    tracing::info!("RPC server listening on: http://{}{}", addr, quill::server::SERVICE_PATH);
    tracing::info!("Press Ctrl+C to shutdown");

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Setup graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}
