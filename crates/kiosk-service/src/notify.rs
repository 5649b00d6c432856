//! Notification sink boundary.
//!
//! The chat platform is an external collaborator; the service only needs to
//! deliver two kinds of messages to an account. The `Notifier` trait is the
//! seam: production uses the platform's bot HTTP API, tests record messages.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use kiosk_core::AccountId;

/// Errors from the notification channel.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The message could not be delivered.
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// Delivers user-facing messages through the chat platform.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver the access reference for a fulfilled purchase.
    async fn send_access(
        &self,
        account_id: AccountId,
        package_name: &str,
        access_reference: &str,
    ) -> Result<(), NotifyError>;

    /// Tell the account its payment invoice expired.
    async fn send_expiry_notice(
        &self,
        account_id: AccountId,
        package_name: &str,
        amount_cents: i64,
    ) -> Result<(), NotifyError>;
}

/// Notifier backed by the chat platform's bot HTTP API.
#[derive(Debug, Clone)]
pub struct BotApiNotifier {
    client: Client,
    base_url: String,
    token: String,
}

impl BotApiNotifier {
    /// Create a new bot API notifier.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with
    /// default settings).
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    async fn send_message(&self, account_id: AccountId, text: &str) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "chat_id": account_id.as_i64(),
                "text": text,
                "parse_mode": "HTML",
            }))
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(NotifyError::Delivery(format!(
                "platform returned HTTP {}",
                response.status()
            )))
        }
    }
}

#[async_trait]
impl Notifier for BotApiNotifier {
    async fn send_access(
        &self,
        account_id: AccountId,
        package_name: &str,
        access_reference: &str,
    ) -> Result<(), NotifyError> {
        let text = format!(
            "<b>Payment confirmed!</b>\n\n\
             Package: {package_name}\n\n\
             Your access link:\n{access_reference}\n\n\
             Thank you for your purchase!"
        );
        self.send_message(account_id, &text).await
    }

    async fn send_expiry_notice(
        &self,
        account_id: AccountId,
        package_name: &str,
        amount_cents: i64,
    ) -> Result<(), NotifyError> {
        #[allow(clippy::cast_precision_loss)]
        let amount = amount_cents as f64 / 100.0;
        let text = format!(
            "<b>Payment expired</b>\n\n\
             Your payment invoice for {package_name} (${amount:.2}) has expired.\n\
             Please create a new payment if you still want to purchase."
        );
        self.send_message(account_id, &text).await
    }
}

/// Notifier that only logs, used when no bot token is configured.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_access(
        &self,
        account_id: AccountId,
        package_name: &str,
        access_reference: &str,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            account_id = %account_id,
            package = %package_name,
            access_reference = %access_reference,
            "Notifier not configured - access message logged only"
        );
        Ok(())
    }

    async fn send_expiry_notice(
        &self,
        account_id: AccountId,
        package_name: &str,
        amount_cents: i64,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            account_id = %account_id,
            package = %package_name,
            amount_cents = %amount_cents,
            "Notifier not configured - expiry notice logged only"
        );
        Ok(())
    }
}
