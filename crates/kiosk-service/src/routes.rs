//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{accounts, catalog, checkout, health, stats, webhooks};
use crate::state::AppState;

/// Maximum concurrent requests for general API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## API (service API key)
/// - `POST /v1/accounts` - Register account
/// - `GET /v1/accounts/:id` - Get account
/// - `DELETE /v1/accounts/:id` - Deactivate account
/// - `GET /v1/accounts/:id/purchases` - Purchase history
/// - `POST /v1/checkout` - Initiate checkout
/// - `GET /v1/catalog` - List enabled packages
///
/// ## Admin (admin API key)
/// - `POST /v1/catalog/reload` - Reload the catalog file
/// - `GET /v1/stats` - Aggregate sales statistics
///
/// ## Webhooks (signature verification)
/// - `POST /webhooks/payment` - Payment processor callbacks
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let api_routes = Router::new()
        // Accounts
        .route("/accounts", post(accounts::create_account))
        .route("/accounts/:id", get(accounts::get_account))
        .route("/accounts/:id", delete(accounts::deactivate_account))
        .route("/accounts/:id/purchases", get(accounts::list_purchases))
        // Checkout
        .route("/checkout", post(checkout::checkout))
        // Catalog
        .route("/catalog", get(catalog::list_catalog))
        .route("/catalog/reload", post(catalog::reload_catalog))
        // Reporting
        .route("/stats", get(stats::get_statistics))
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        // API v1 routes (rate limited)
        .nest("/v1", api_routes)
        // Webhooks (no rate limit - controlled by the processor)
        .route("/webhooks/payment", post(webhooks::payment_webhook))
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
