mod api;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use labelbridge_core::account::{AccountStore, SqliteAccountStore};
use labelbridge_core::carrier::{CarrierClient, HttpCarrierClient, PrintOptions, TokenCache};
use labelbridge_core::marketplace::{HttpMarketplaceClient, MarketplaceClient};
use labelbridge_core::orchestrator::LabelOrchestrator;
use labelbridge_core::{load_config, validate_config};

use api::create_router;
use state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("LABELBRIDGE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);
    info!("Carrier API: {}", config.carrier.base_url);

    // Create account store
    let accounts: Arc<dyn AccountStore> = Arc::new(
        SqliteAccountStore::new(&config.database.path)
            .context("Failed to create account store")?,
    );
    info!("Account store initialized");

    // Create carrier client and token cache
    let carrier: Arc<dyn CarrierClient> = Arc::new(HttpCarrierClient::new(
        config.carrier.clone(),
        PrintOptions::from(&config.workflow),
    ));
    let tokens = Arc::new(TokenCache::new());

    // Create label orchestrator
    let orchestrator = Arc::new(LabelOrchestrator::new(
        Arc::clone(&accounts),
        carrier,
        Arc::clone(&tokens),
        config.workflow.clone(),
    ));
    info!("Label orchestrator initialized");

    // Create marketplace client if configured
    let marketplace: Option<Arc<dyn MarketplaceClient>> = match &config.marketplace {
        Some(marketplace_config) => {
            info!("Marketplace API: {}", marketplace_config.base_url);
            Some(Arc::new(HttpMarketplaceClient::new(
                marketplace_config.clone(),
            )))
        }
        None => {
            info!("Marketplace not configured");
            None
        }
    };

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        accounts,
        tokens,
        orchestrator,
        marketplace,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
