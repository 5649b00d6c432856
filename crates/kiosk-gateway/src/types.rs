//! Wire types for the payment processor's invoice API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kiosk_core::{AccountId, PackageId, TrackId};

/// Caller-supplied parameters for invoice creation.
///
/// Everything else on the outbound request (validity window, fee policy,
/// settlement currency) is fixed business policy baked into the gateway.
#[derive(Debug, Clone)]
pub struct InvoiceRequest {
    /// Invoice amount in cents.
    pub amount_cents: i64,

    /// The package being purchased (goes into the order id and description).
    pub package_id: PackageId,

    /// The purchasing account.
    pub account_id: AccountId,

    /// Webhook URL the processor calls back with status updates.
    pub callback_url: String,

    /// Display name for the invoice description, if known.
    pub display_name: Option<String>,
}

/// A created invoice, normalized from the processor's response.
#[derive(Debug, Clone, Serialize)]
pub struct Invoice {
    /// Processor-issued unique reference.
    pub track_id: TrackId,

    /// URL where the payer completes the payment.
    pub payment_url: String,

    /// Invoice amount in cents.
    pub amount_cents: i64,

    /// Processor-reported expiry, if provided.
    pub expires_at: Option<DateTime<Utc>>,

    /// Our synthesized order id, echoed on the processor side for debugging.
    pub order_id: String,
}

/// Outbound invoice creation body.
#[derive(Debug, Serialize)]
pub(crate) struct CreateInvoiceBody {
    /// Amount in whole currency units (the processor takes USD, not cents).
    pub amount: f64,
    pub currency: &'static str,
    /// Validity window in minutes.
    pub lifetime: i64,
    pub fee_paid_by_payer: u8,
    pub under_paid_coverage: f64,
    pub to_currency: &'static str,
    pub auto_withdrawal: bool,
    pub mixed_payment: bool,
    pub callback_url: String,
    pub order_id: String,
    pub description: String,
}

/// Processor response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct InvoiceEnvelope {
    pub status: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<InvoiceData>,
    #[serde(default)]
    pub error: Option<EnvelopeError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InvoiceData {
    pub track_id: String,
    pub payment_url: String,
    #[serde(default)]
    pub expired_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EnvelopeError {
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
