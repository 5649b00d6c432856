//! Payment lifecycle types for kiosk.
//!
//! A `PaymentIntent` tracks a processor invoice from creation through its
//! terminal state. A `Purchase` is the append-only fulfillment record written
//! exactly once when an intent completes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, PackageId, PurchaseId, TrackId};

/// Default invoice validity window in minutes, used when the processor does
/// not report an explicit expiry.
pub const DEFAULT_VALIDITY_MINUTES: i64 = 30;

/// Lifecycle status of a payment intent.
///
/// Transitions are monotone forward: `Pending` may move to any terminal
/// state, and terminal states never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    /// Invoice created, awaiting payment.
    Pending,

    /// Payment confirmed and fulfillment triggered.
    Completed,

    /// Invoice validity window elapsed without payment.
    Expired,

    /// The processor reported the payment as failed.
    Failed,
}

impl IntentStatus {
    /// Whether this status is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Expired => "expired",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// A payment intent tracking one processor invoice.
///
/// The processor-issued `track_id` is the primary key and the join key
/// between internal state and webhook callbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Unique external reference issued by the processor.
    pub track_id: TrackId,

    /// The purchasing account.
    pub account_id: AccountId,

    /// The package being purchased.
    pub package_id: PackageId,

    /// Invoice amount in cents.
    pub amount_cents: i64,

    /// Invoice currency code.
    pub currency: String,

    /// Current lifecycle status.
    pub status: IntentStatus,

    /// When the invoice was created.
    pub created_at: DateTime<Utc>,

    /// When a terminal status was applied, if any.
    pub completed_at: Option<DateTime<Utc>>,
}

impl PaymentIntent {
    /// Create a new pending intent.
    #[must_use]
    pub fn new(
        track_id: TrackId,
        account_id: AccountId,
        package_id: PackageId,
        amount_cents: i64,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            track_id,
            account_id,
            package_id,
            amount_cents,
            currency: currency.into(),
            status: IntentStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}

/// An append-only fulfillment record.
///
/// Created exactly once per successfully fulfilled payment intent, after the
/// access reference has been delivered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    /// Unique purchase id (ULID for time-ordering).
    pub id: PurchaseId,

    /// The purchasing account.
    pub account_id: AccountId,

    /// The purchased package.
    pub package_id: PackageId,

    /// Amount paid in cents.
    pub amount_cents: i64,

    /// The access reference delivered to the account.
    pub access_reference: String,

    /// When the purchase was fulfilled.
    pub purchased_at: DateTime<Utc>,
}

impl Purchase {
    /// Create a new purchase record with a fresh id.
    #[must_use]
    pub fn new(
        account_id: AccountId,
        package_id: PackageId,
        amount_cents: i64,
        access_reference: impl Into<String>,
    ) -> Self {
        Self {
            id: PurchaseId::generate(),
            account_id,
            package_id,
            amount_cents,
            access_reference: access_reference.into(),
            purchased_at: Utc::now(),
        }
    }
}
