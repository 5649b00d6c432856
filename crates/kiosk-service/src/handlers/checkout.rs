//! Checkout handler.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use kiosk_core::{Account, AccountId, PackageId};

use crate::auth::require_service_key;
use crate::error::ApiError;
use crate::state::AppState;

/// Request to initiate a checkout.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    /// Purchasing account's chat platform user id.
    pub account_id: i64,

    /// The package to buy.
    pub package_id: String,

    /// Optional display name, used on the invoice description.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Checkout response carrying the processor payment page.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    /// Processor-issued track id.
    pub track_id: String,

    /// URL of the hosted payment page.
    pub payment_url: String,

    /// Invoice amount in cents.
    pub amount_cents: i64,

    /// Invoice expiry, when the processor reported one.
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,

    /// Our synthesized order id.
    pub order_id: String,
}

/// Initiate a checkout: register the account if needed, create a processor
/// invoice, and record the pending intent.
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    require_service_key(&headers, &state.config)?;

    let account_id = AccountId::new(request.account_id);
    let package_id = PackageId::new(request.package_id);

    // Registration is idempotent; a returning buyer keeps their record.
    let account = Account::new(account_id, request.display_name.clone());
    state.ledger.create_account(&account)?;

    let invoice = state
        .orchestrator
        .initiate(account_id, package_id, request.display_name)
        .await?;

    Ok(Json(CheckoutResponse {
        track_id: invoice.track_id.to_string(),
        payment_url: invoice.payment_url,
        amount_cents: invoice.amount_cents,
        expires_at: invoice.expires_at,
        order_id: invoice.order_id,
    }))
}
