//! Payment processor webhook handler.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use kiosk_core::TrackId;

use crate::crypto::{constant_time_eq, hmac_sha256_hex};
use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the processor's HMAC signature.
pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// Processor callback payload.
///
/// The processor sends more fields; only the two reconciliation inputs are
/// read, unknown fields are ignored.
#[derive(Debug, Deserialize)]
pub struct PaymentCallback {
    /// Processor-issued track id.
    #[serde(rename = "trackId")]
    pub track_id: Option<String>,

    /// Reported payment status.
    #[serde(default)]
    pub status: Option<String>,
}

/// Webhook response carrying the reconciliation outcome.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Outcome label.
    pub status: &'static str,
}

/// Handle payment processor callbacks.
///
/// The body is taken raw so the signature covers the exact bytes received.
/// Malformed payloads and missing track ids are client errors; internal
/// failures surface as well-formed 500 responses so the processor retries.
pub async fn payment_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookResponse>, ApiError> {
    if let Some(webhook_secret) = &state.config.webhook_secret {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::BadRequest("Missing webhook signature".into()))?;

        let expected = hmac_sha256_hex(webhook_secret, &body);
        if !constant_time_eq(&expected, signature) {
            tracing::warn!("Invalid webhook signature");
            return Err(ApiError::BadRequest("Invalid webhook signature".into()));
        }
    } else {
        tracing::warn!("Webhook secret not configured - skipping signature verification");
    }

    let callback: PaymentCallback =
        serde_json::from_str(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let track_id = callback
        .track_id
        .ok_or_else(|| ApiError::BadRequest("Missing trackId".into()))?;
    let status = callback.status.unwrap_or_default();

    tracing::info!(track_id = %track_id, status = %status, "Received payment callback");

    let outcome = state
        .orchestrator
        .reconcile(&TrackId::new(track_id), &status)
        .await?;

    Ok(Json(WebhookResponse {
        status: outcome.label(),
    }))
}
