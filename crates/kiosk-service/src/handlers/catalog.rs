//! Catalog handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use kiosk_core::PackageCatalog;

use crate::auth::{require_admin_key, require_service_key};
use crate::error::ApiError;
use crate::state::AppState;

/// One purchasable package, as shown to buyers.
///
/// The access reference never leaves the service through this surface.
#[derive(Debug, Serialize)]
pub struct CatalogEntryResponse {
    /// Package id.
    pub package_id: String,

    /// Human-readable name.
    pub display_name: String,

    /// Price in cents.
    pub price_cents: i64,
}

/// List the enabled packages.
pub async fn list_catalog(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<CatalogEntryResponse>>, ApiError> {
    require_service_key(&headers, &state.config)?;

    let catalog = state.catalog.read().await;
    let entries = catalog
        .packages
        .iter()
        .filter(|(_, entry)| entry.enabled)
        .map(|(package_id, entry)| CatalogEntryResponse {
            package_id: package_id.to_string(),
            display_name: entry.display_name.clone(),
            price_cents: entry.price_cents,
        })
        .collect();

    Ok(Json(entries))
}

/// Catalog reload response.
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    /// Number of packages in the reloaded catalog.
    pub packages: usize,
}

/// Reload the catalog from its configured file.
///
/// The new catalog replaces the old one atomically; on a load failure the
/// old catalog stays in effect.
pub async fn reload_catalog(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ReloadResponse>, ApiError> {
    require_admin_key(&headers, &state.config)?;

    let loaded = PackageCatalog::load(&state.config.catalog_path).map_err(|e| {
        tracing::error!(path = %state.config.catalog_path, error = %e, "Catalog reload failed");
        ApiError::BadRequest(format!("catalog reload failed: {e}"))
    })?;

    let packages = loaded.packages.len();
    *state.catalog.write().await = loaded;

    tracing::info!(path = %state.config.catalog_path, packages = %packages, "Catalog reloaded");
    Ok(Json(ReloadResponse { packages }))
}
