//! Payment lifecycle orchestration.
//!
//! The orchestrator owns the pending-to-terminal state machine for payment
//! intents. It initiates checkouts against the processor, reconciles webhook
//! callbacks, and sweeps expired invoices from the durable deadline index.
//!
//! All status transitions for one track id run inside a per-track critical
//! section, so a webhook and the expiry sweep racing over the same intent
//! serialize and the first terminal transition wins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use kiosk_core::{
    AccountId, IntentStatus, PackageCatalog, PackageId, PaymentIntent, TrackId,
    DEFAULT_VALIDITY_MINUTES,
};
use kiosk_gateway::{GatewayClient, GatewayError, Invoice, InvoiceRequest};
use kiosk_ledger::{Ledger, LedgerError};

use crate::fulfillment::FulfillmentDispatcher;
use crate::notify::Notifier;

/// Errors from checkout initiation.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// The package is unknown or disabled.
    #[error("package unavailable: {package_id}")]
    PackageUnavailable {
        /// The requested package.
        package_id: String,
    },

    /// No processor client is configured.
    #[error("payment processor is not configured")]
    ProcessorUnavailable,

    /// The processor call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A ledger operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Result of reconciling one processor callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The track id is unknown; nothing was changed.
    Ignored,

    /// The intent was already in a terminal state; nothing was changed.
    AlreadyProcessed,

    /// The payment was confirmed and fulfillment dispatched.
    Completed,

    /// The invoice expired unpaid.
    Expired,

    /// The processor reported the payment failed.
    Failed,

    /// The reported status is non-terminal; the intent stays pending.
    Pending,
}

impl ReconcileOutcome {
    /// Stable label for callback responses and logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Ignored => "ignored",
            Self::AlreadyProcessed => "already_processed",
            Self::Completed => "success",
            Self::Expired => "expired",
            Self::Failed => "failed",
            Self::Pending => "pending",
        }
    }
}

/// Drives payment intents from creation to a terminal state.
pub struct Orchestrator {
    ledger: Arc<dyn Ledger>,
    gateway: Option<Arc<GatewayClient>>,
    notifier: Arc<dyn Notifier>,
    catalog: Arc<RwLock<PackageCatalog>>,
    dispatcher: FulfillmentDispatcher,
    callback_url: String,
    track_locks: Mutex<HashMap<TrackId, Arc<tokio::sync::Mutex<()>>>>,
}

impl Orchestrator {
    /// Create a new orchestrator.
    ///
    /// A `None` gateway leaves reconciliation and sweeping functional but
    /// rejects new checkouts with `CheckoutError::ProcessorUnavailable`.
    #[must_use]
    pub fn new(
        ledger: Arc<dyn Ledger>,
        gateway: Option<Arc<GatewayClient>>,
        notifier: Arc<dyn Notifier>,
        catalog: Arc<RwLock<PackageCatalog>>,
        callback_url: impl Into<String>,
    ) -> Self {
        let dispatcher =
            FulfillmentDispatcher::new(Arc::clone(&ledger), Arc::clone(&notifier), Arc::clone(&catalog));
        Self {
            ledger,
            gateway,
            notifier,
            catalog,
            dispatcher,
            callback_url: callback_url.into(),
            track_locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, track_id: &TrackId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.track_locks.lock().expect("track lock map poisoned");
        Arc::clone(
            locks
                .entry(track_id.clone())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }

    fn release_lock(&self, track_id: &TrackId) {
        let mut locks = self.track_locks.lock().expect("track lock map poisoned");
        // Drop the entry only when no other task holds a clone.
        if let Some(lock) = locks.get(track_id) {
            if Arc::strong_count(lock) == 1 {
                locks.remove(track_id);
            }
        }
    }

    /// Initiate a checkout: price the package, create a processor invoice,
    /// and record the pending intent plus its expiry deadline.
    ///
    /// # Errors
    ///
    /// Returns a `CheckoutError` if the package is unavailable, the processor
    /// is unconfigured or rejects the request, or a ledger write fails.
    pub async fn initiate(
        &self,
        account_id: AccountId,
        package_id: PackageId,
        display_name: Option<String>,
    ) -> Result<Invoice, CheckoutError> {
        let price_cents = {
            let catalog = self.catalog.read().await;
            catalog
                .enabled_entry(&package_id)
                .map(|entry| entry.price_cents)
                .ok_or_else(|| CheckoutError::PackageUnavailable {
                    package_id: package_id.to_string(),
                })?
        };

        let gateway = self
            .gateway
            .as_ref()
            .ok_or(CheckoutError::ProcessorUnavailable)?;

        let invoice = gateway
            .create_invoice(InvoiceRequest {
                amount_cents: price_cents,
                package_id: package_id.clone(),
                account_id,
                callback_url: self.callback_url.clone(),
                display_name,
            })
            .await?;

        let intent = PaymentIntent::new(
            invoice.track_id.clone(),
            account_id,
            package_id,
            price_cents,
            "USD",
        );
        self.ledger.record_intent(&intent)?;

        let due_at = invoice
            .expires_at
            .unwrap_or_else(|| Utc::now() + chrono::Duration::minutes(DEFAULT_VALIDITY_MINUTES));
        // The intent is already durable; a lost deadline row only means the
        // sweep cannot expire this invoice and the processor's own Expired
        // callback becomes the sole expiry path. Not worth failing checkout.
        if let Err(err) = self.ledger.record_deadline(&invoice.track_id, due_at) {
            tracing::error!(
                track_id = %invoice.track_id,
                error = %err,
                "Failed to record expiry deadline"
            );
        }

        tracing::info!(
            track_id = %invoice.track_id,
            account_id = %account_id,
            amount_cents = %price_cents,
            due_at = %due_at,
            "Checkout initiated"
        );

        Ok(invoice)
    }

    /// Reconcile one processor callback against the stored intent.
    ///
    /// Unknown track ids are ignored. Terminal intents are never modified,
    /// whatever the processor now reports. Fulfillment failures are logged
    /// and do not roll back the completed status; the payment record is the
    /// source of truth and delivery gaps are recovered manually.
    ///
    /// # Errors
    ///
    /// Returns a `LedgerError` if reading or writing the intent fails.
    pub async fn reconcile(
        &self,
        track_id: &TrackId,
        reported_status: &str,
    ) -> Result<ReconcileOutcome, LedgerError> {
        let lock = self.lock_for(track_id);
        let guard = lock.lock().await;

        let result = self.reconcile_locked(track_id, reported_status).await;

        drop(guard);
        drop(lock);
        self.release_lock(track_id);
        result
    }

    async fn reconcile_locked(
        &self,
        track_id: &TrackId,
        reported_status: &str,
    ) -> Result<ReconcileOutcome, LedgerError> {
        let Some(intent) = self.ledger.get_intent(track_id)? else {
            tracing::info!(track_id = %track_id, status = %reported_status, "Callback for unknown track id ignored");
            return Ok(ReconcileOutcome::Ignored);
        };

        if intent.status.is_terminal() {
            tracing::info!(
                track_id = %track_id,
                stored = %intent.status,
                reported = %reported_status,
                "Callback for settled intent ignored"
            );
            return Ok(ReconcileOutcome::AlreadyProcessed);
        }

        match reported_status {
            "Paid" | "Confirming" => {
                self.ledger
                    .set_intent_status(track_id, IntentStatus::Completed)?;
                if let Err(err) = self.dispatcher.fulfill(&intent).await {
                    tracing::error!(
                        track_id = %track_id,
                        account_id = %intent.account_id,
                        error = %err,
                        "Fulfillment failed for completed payment, manual delivery required"
                    );
                }
                Ok(ReconcileOutcome::Completed)
            }
            "Expired" => {
                self.ledger
                    .set_intent_status(track_id, IntentStatus::Expired)?;
                self.notify_expiry(&intent).await;
                Ok(ReconcileOutcome::Expired)
            }
            "Failed" => {
                self.ledger
                    .set_intent_status(track_id, IntentStatus::Failed)?;
                tracing::warn!(track_id = %track_id, "Processor reported payment failed");
                Ok(ReconcileOutcome::Failed)
            }
            other => {
                tracing::debug!(track_id = %track_id, status = %other, "Intent still pending");
                Ok(ReconcileOutcome::Pending)
            }
        }
    }

    /// Expire all pending intents whose deadline is due at or before `now`.
    ///
    /// Each due intent is handled inside its own per-track critical section,
    /// so a concurrent webhook confirming payment takes precedence. Deadlines
    /// are cleared whether or not the intent was still pending.
    ///
    /// Returns the number of intents moved to `Expired`.
    ///
    /// # Errors
    ///
    /// Returns a `LedgerError` if scanning the deadline index fails. Failures
    /// on individual intents are logged and skipped.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, LedgerError> {
        let due = self.ledger.due_deadlines(now)?;
        let mut expired = 0;

        for (due_at, track_id) in due {
            let lock = self.lock_for(&track_id);
            let guard = lock.lock().await;

            match self.expire_one(&track_id) {
                Ok(Some(intent)) => {
                    expired += 1;
                    self.notify_expiry(&intent).await;
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::error!(track_id = %track_id, error = %err, "Failed to expire intent");
                    drop(guard);
                    drop(lock);
                    self.release_lock(&track_id);
                    continue;
                }
            }

            if let Err(err) = self.ledger.clear_deadline(&track_id, due_at) {
                tracing::error!(track_id = %track_id, error = %err, "Failed to clear deadline");
            }

            drop(guard);
            drop(lock);
            self.release_lock(&track_id);
        }

        if expired > 0 {
            tracing::info!(count = %expired, "Expired unpaid invoices");
        }
        Ok(expired)
    }

    /// Transition one intent to `Expired` if it is still pending.
    ///
    /// Returns the intent when it was expired, `None` when there was nothing
    /// to do (unknown track id or already terminal).
    fn expire_one(&self, track_id: &TrackId) -> Result<Option<PaymentIntent>, LedgerError> {
        let Some(intent) = self.ledger.get_intent(track_id)? else {
            tracing::warn!(track_id = %track_id, "Deadline for unknown track id");
            return Ok(None);
        };
        if intent.status.is_terminal() {
            return Ok(None);
        }
        self.ledger
            .set_intent_status(track_id, IntentStatus::Expired)?;
        Ok(Some(intent))
    }

    async fn notify_expiry(&self, intent: &PaymentIntent) {
        let package_name = {
            let catalog = self.catalog.read().await;
            catalog
                .entry(&intent.package_id)
                .map_or_else(|| intent.package_id.to_string(), |e| e.display_name.clone())
        };
        if let Err(err) = self
            .notifier
            .send_expiry_notice(intent.account_id, &package_name, intent.amount_cents)
            .await
        {
            tracing::warn!(
                track_id = %intent.track_id,
                account_id = %intent.account_id,
                error = %err,
                "Failed to send expiry notice"
            );
        }
    }

    /// Run the periodic expiry sweep until the process exits.
    pub async fn run_expiry_sweeper(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(err) = self.sweep_expired(Utc::now()).await {
                tracing::error!(error = %err, "Expiry sweep failed");
            }
        }
    }
}
