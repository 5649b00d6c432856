//! Fulfillment dispatcher.
//!
//! Given a confirmed payment, delivers the access reference and records the
//! purchase. Delivery comes first: if the notification channel fails, the
//! purchase record is not written and the gap is surfaced as an operational
//! alert for manual recovery. There is no automatic retry.

use std::sync::Arc;

use tokio::sync::RwLock;

use kiosk_core::{PackageCatalog, PaymentIntent, Purchase};
use kiosk_ledger::Ledger;

use crate::notify::{Notifier, NotifyError};

/// Errors from fulfillment.
#[derive(Debug, thiserror::Error)]
pub enum FulfillmentError {
    /// The catalog has no access reference for the package.
    ///
    /// Catalog misconfiguration; requires admin intervention, never retried.
    #[error("no access reference configured for package: {package_id}")]
    MissingAccessReference {
        /// The misconfigured package.
        package_id: String,
    },

    /// The notification channel failed; the purchase was not recorded.
    #[error("access delivery failed: {0}")]
    DeliveryFailed(#[from] NotifyError),

    /// Writing the purchase record failed after delivery.
    #[error(transparent)]
    Ledger(#[from] kiosk_ledger::LedgerError),
}

/// Grants access for completed payments and records purchases.
pub struct FulfillmentDispatcher {
    ledger: Arc<dyn Ledger>,
    notifier: Arc<dyn Notifier>,
    catalog: Arc<RwLock<PackageCatalog>>,
}

impl FulfillmentDispatcher {
    /// Create a new dispatcher.
    #[must_use]
    pub fn new(
        ledger: Arc<dyn Ledger>,
        notifier: Arc<dyn Notifier>,
        catalog: Arc<RwLock<PackageCatalog>>,
    ) -> Self {
        Self {
            ledger,
            notifier,
            catalog,
        }
    }

    /// Fulfill a completed payment intent: deliver access, then record the
    /// purchase.
    ///
    /// # Errors
    ///
    /// Returns a `FulfillmentError`; see the variant docs for recovery
    /// expectations.
    pub async fn fulfill(&self, intent: &PaymentIntent) -> Result<Purchase, FulfillmentError> {
        let (access_reference, package_name) = {
            let catalog = self.catalog.read().await;
            let entry = catalog.entry(&intent.package_id);

            let access_reference = entry
                .and_then(|e| e.access_reference.clone())
                .ok_or_else(|| FulfillmentError::MissingAccessReference {
                    package_id: intent.package_id.to_string(),
                })?;

            let package_name = entry
                .map_or_else(|| intent.package_id.to_string(), |e| e.display_name.clone());

            (access_reference, package_name)
        };

        self.notifier
            .send_access(intent.account_id, &package_name, &access_reference)
            .await?;

        let purchase = Purchase::new(
            intent.account_id,
            intent.package_id.clone(),
            intent.amount_cents,
            access_reference,
        );
        self.ledger.record_purchase(&purchase)?;

        tracing::info!(
            track_id = %intent.track_id,
            account_id = %intent.account_id,
            package_id = %intent.package_id,
            amount_cents = %intent.amount_cents,
            purchase_id = %purchase.id,
            "Purchase fulfilled"
        );

        Ok(purchase)
    }
}
