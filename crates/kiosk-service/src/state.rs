//! Shared application state.

use std::sync::Arc;

use tokio::sync::RwLock;

use kiosk_core::PackageCatalog;
use kiosk_gateway::GatewayClient;
use kiosk_ledger::Ledger;

use crate::config::ServiceConfig;
use crate::notify::Notifier;
use crate::orchestrator::Orchestrator;

/// State shared across all request handlers.
///
/// Every collaborator is passed in explicitly; there are no process-global
/// singletons, so tests can assemble a state from fakes.
pub struct AppState {
    /// Durable payment ledger.
    pub ledger: Arc<dyn Ledger>,

    /// Payment lifecycle orchestrator.
    pub orchestrator: Arc<Orchestrator>,

    /// Package catalog, swapped wholesale on reload.
    pub catalog: Arc<RwLock<PackageCatalog>>,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Assemble the application state and its orchestrator.
    #[must_use]
    pub fn new(
        ledger: Arc<dyn Ledger>,
        gateway: Option<Arc<GatewayClient>>,
        notifier: Arc<dyn Notifier>,
        catalog: Arc<RwLock<PackageCatalog>>,
        config: ServiceConfig,
    ) -> Self {
        let orchestrator = Arc::new(Orchestrator::new(
            Arc::clone(&ledger),
            gateway,
            notifier,
            Arc::clone(&catalog),
            config.callback_url.clone(),
        ));
        Self {
            ledger,
            orchestrator,
            catalog,
            config,
        }
    }
}
