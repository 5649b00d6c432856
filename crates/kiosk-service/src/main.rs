//! Kiosk Service - HTTP API for the storefront payment lifecycle.
//!
//! This is the main entry point for the kiosk service.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kiosk_core::PackageCatalog;
use kiosk_gateway::GatewayClient;
use kiosk_ledger::RocksLedger;
use kiosk_service::notify::{BotApiNotifier, LogNotifier, Notifier};
use kiosk_service::{create_router, AppState, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,kiosk=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Kiosk Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        data_dir = %config.data_dir,
        catalog_path = %config.catalog_path,
        processor_configured = %config.processor_api_key.is_some(),
        webhook_secret_configured = %config.webhook_secret.is_some(),
        bot_configured = %config.bot_token.is_some(),
        "Service configuration loaded"
    );

    // Initialize RocksDB ledger
    tracing::info!(path = %config.data_dir, "Opening RocksDB ledger");
    let ledger = Arc::new(RocksLedger::open(&config.data_dir)?);

    // Load the package catalog; an absent file leaves the catalog empty
    // until an admin reloads it.
    let catalog = match PackageCatalog::load(&config.catalog_path) {
        Ok(catalog) => {
            tracing::info!(
                path = %config.catalog_path,
                packages = %catalog.packages.len(),
                "Package catalog loaded"
            );
            catalog
        }
        Err(err) => {
            tracing::warn!(
                path = %config.catalog_path,
                error = %err,
                "Failed to load package catalog, starting empty"
            );
            PackageCatalog::default()
        }
    };
    let catalog = Arc::new(RwLock::new(catalog));

    // Processor gateway (optional; checkout is rejected without it)
    let gateway = config.processor_api_key.as_ref().map_or_else(
        || {
            tracing::warn!("Processor API key not configured - checkout unavailable");
            None
        },
        |api_key| {
            Some(Arc::new(GatewayClient::new(
                config.processor_api_url.clone(),
                api_key.clone(),
            )))
        },
    );

    // Notification sink (falls back to log-only without a bot token)
    let notifier: Arc<dyn Notifier> = match (&config.bot_api_url, &config.bot_token) {
        (Some(base_url), Some(token)) => {
            Arc::new(BotApiNotifier::new(base_url.clone(), token.clone()))
        }
        _ => {
            tracing::warn!("Bot API not configured - notifications will only be logged");
            Arc::new(LogNotifier)
        }
    };

    // Build app state
    let state = AppState::new(ledger, gateway, notifier, catalog, config.clone());

    // Spawn the durable expiry sweeper
    let sweeper = Arc::clone(&state.orchestrator);
    tokio::spawn(sweeper.run_expiry_sweeper(Duration::from_secs(config.sweep_interval_seconds)));

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
