//! Admin reporting handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use kiosk_ledger::Statistics;

use crate::auth::require_admin_key;
use crate::error::ApiError;
use crate::state::AppState;

/// Aggregate sales statistics over all recorded purchases.
pub async fn get_statistics(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Statistics>, ApiError> {
    require_admin_key(&headers, &state.config)?;

    let stats = state.ledger.aggregate_statistics()?;
    Ok(Json(stats))
}
