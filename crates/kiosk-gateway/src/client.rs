//! Invoice gateway client implementation.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use reqwest::Client;

use kiosk_core::TrackId;

use crate::error::GatewayError;
use crate::types::{CreateInvoiceBody, Invoice, InvoiceEnvelope, InvoiceRequest};

/// Request timeout for processor calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// Fixed invoice policy. These are business constants baked into every
// request, not caller-supplied parameters.

/// Invoice validity window in minutes.
const INVOICE_LIFETIME_MINUTES: i64 = 30;

/// The payer covers network fees.
const FEE_PAID_BY_PAYER: u8 = 1;

/// Tolerated underpayment margin in percent.
const UNDER_PAID_COVERAGE: f64 = 2.5;

/// Settlement currency on the processor side.
const SETTLEMENT_CURRENCY: &str = "USDT";

/// Invoice currency.
const INVOICE_CURRENCY: &str = "USD";

/// Payment processor API client.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GatewayClient {
    /// Create a new gateway client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Processor API URL (e.g., `"https://api.processor.example"`)
    /// * `api_key` - Merchant API key
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with
    /// default settings).
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Create a payment invoice.
    ///
    /// A non-200/absent-data envelope always becomes `ApiRejected` carrying
    /// the processor's error category and message. Nothing is retried here.
    ///
    /// # Errors
    ///
    /// Returns a `GatewayError` describing the normalized failure kind.
    pub async fn create_invoice(&self, request: InvoiceRequest) -> Result<Invoice, GatewayError> {
        let order_id = synthesize_order_id(&request);

        #[allow(clippy::cast_precision_loss)]
        let amount = request.amount_cents as f64 / 100.0;

        let payer = request
            .display_name
            .clone()
            .unwrap_or_else(|| request.account_id.to_string());

        let body = CreateInvoiceBody {
            amount,
            currency: INVOICE_CURRENCY,
            lifetime: INVOICE_LIFETIME_MINUTES,
            fee_paid_by_payer: FEE_PAID_BY_PAYER,
            under_paid_coverage: UNDER_PAID_COVERAGE,
            to_currency: SETTLEMENT_CURRENCY,
            auto_withdrawal: false,
            mixed_payment: true,
            callback_url: request.callback_url.clone(),
            order_id: order_id.clone(),
            description: format!("Package {} for {payer}", request.package_id),
        };

        tracing::info!(
            account_id = %request.account_id,
            package_id = %request.package_id,
            amount_cents = %request.amount_cents,
            order_id = %order_id,
            "Creating processor invoice"
        );

        let response = self
            .client
            .post(format!("{}/v1/payment/invoice", self.base_url))
            .header("merchant_api_key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let envelope: InvoiceEnvelope = response
            .json()
            .await
            .map_err(|_| GatewayError::InvalidResponse)?;

        match (envelope.status, envelope.data) {
            (Some(200), Some(data)) => {
                let expires_at = data
                    .expired_at
                    .and_then(|ts| Utc.timestamp_opt(ts, 0).single());

                tracing::info!(track_id = %data.track_id, "Processor invoice created");

                Ok(Invoice {
                    track_id: TrackId::new(data.track_id),
                    payment_url: data.payment_url,
                    amount_cents: request.amount_cents,
                    expires_at,
                    order_id,
                })
            }
            (status, _) => {
                let (category, message) = match envelope.error {
                    Some(err) => (
                        err.error_type
                            .or(err.key)
                            .unwrap_or_else(|| "unknown".into()),
                        err.message
                            .or(envelope.message)
                            .unwrap_or_else(|| "unknown error".into()),
                    ),
                    None => (
                        "unknown".into(),
                        envelope.message.unwrap_or_else(|| "unknown error".into()),
                    ),
                };

                tracing::error!(
                    status = ?status,
                    category = %category,
                    message = %message,
                    order_id = %order_id,
                    "Processor rejected invoice request"
                );

                Err(GatewayError::ApiRejected { category, message })
            }
        }
    }
}

/// Synthesize a globally-unique order id from package, account, and time.
///
/// The order id is ours, independent of the processor-issued track id, and
/// exists to aid idempotency and debugging on the processor side.
fn synthesize_order_id(request: &InvoiceRequest) -> String {
    format!(
        "PKG_{}_{}_{}",
        request.package_id,
        request.account_id,
        Utc::now().timestamp()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_core::{AccountId, PackageId};

    #[test]
    fn order_id_carries_package_and_account() {
        let request = InvoiceRequest {
            amount_cents: 1500,
            package_id: PackageId::new("100_videos"),
            account_id: AccountId::new(42),
            callback_url: "https://kiosk.example/webhooks/payment".into(),
            display_name: None,
        };

        let order_id = synthesize_order_id(&request);
        assert!(order_id.starts_with("PKG_100_videos_42_"));
    }
}
