//! Account handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use kiosk_core::{Account, AccountId};

use crate::auth::require_service_key;
use crate::error::ApiError;
use crate::state::AppState;

/// Request to register an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Chat platform user id.
    pub account_id: i64,

    /// Optional display name.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Account response body.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account id.
    pub account_id: i64,

    /// Display name, if any.
    pub display_name: Option<String>,

    /// Whether the account is active.
    pub is_active: bool,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.id.as_i64(),
            display_name: account.display_name,
            is_active: account.is_active,
        }
    }
}

/// Register an account, or return the existing record unchanged.
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CreateAccountRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    require_service_key(&headers, &state.config)?;

    let account_id = AccountId::new(request.account_id);
    let account = Account::new(account_id, request.display_name);
    state.ledger.create_account(&account)?;

    // First registration is preserved, so read back what is stored.
    let stored = state
        .ledger
        .get_account(&account_id)?
        .ok_or_else(|| ApiError::Internal("account missing after create".into()))?;

    tracing::info!(account_id = %account_id, "Account registered");
    Ok(Json(stored.into()))
}

/// Get an account by id.
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(account_id): Path<i64>,
) -> Result<Json<AccountResponse>, ApiError> {
    require_service_key(&headers, &state.config)?;

    let account_id = AccountId::new(account_id);
    let account = state
        .ledger
        .get_account(&account_id)?
        .ok_or_else(|| ApiError::NotFound(format!("account not found: {account_id}")))?;

    Ok(Json(account.into()))
}

/// Flag an account inactive.
///
/// Purchase history is retained; only the active flag changes.
pub async fn deactivate_account(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(account_id): Path<i64>,
) -> Result<Json<AccountResponse>, ApiError> {
    require_service_key(&headers, &state.config)?;

    let account_id = AccountId::new(account_id);
    state.ledger.deactivate_account(&account_id)?;

    let account = state
        .ledger
        .get_account(&account_id)?
        .ok_or_else(|| ApiError::NotFound(format!("account not found: {account_id}")))?;

    tracing::info!(account_id = %account_id, "Account deactivated");
    Ok(Json(account.into()))
}

/// One purchase in a history listing.
#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    /// Purchase id.
    pub id: String,

    /// Purchased package.
    pub package_id: String,

    /// Amount paid in cents.
    pub amount_cents: i64,

    /// When the purchase was fulfilled.
    pub purchased_at: chrono::DateTime<chrono::Utc>,
}

/// Purchase history query parameters.
#[derive(Debug, Deserialize)]
pub struct PurchaseListQuery {
    /// Page size (default 20, capped at 100).
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Offset into the newest-first listing.
    #[serde(default)]
    pub offset: usize,
}

const fn default_limit() -> usize {
    20
}

/// List an account's purchases, newest first.
pub async fn list_purchases(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(account_id): Path<i64>,
    axum::extract::Query(query): axum::extract::Query<PurchaseListQuery>,
) -> Result<Json<Vec<PurchaseResponse>>, ApiError> {
    require_service_key(&headers, &state.config)?;

    let account_id = AccountId::new(account_id);
    let limit = query.limit.min(100);
    let purchases = state
        .ledger
        .list_purchases_by_account(&account_id, limit, query.offset)?;

    Ok(Json(
        purchases
            .into_iter()
            .map(|p| PurchaseResponse {
                id: p.id.to_string(),
                package_id: p.package_id.to_string(),
                amount_cents: p.amount_cents,
                purchased_at: p.purchased_at,
            })
            .collect(),
    ))
}
