//! Durable ledger for kiosk.
//!
//! This crate provides persistent storage for accounts, payment intents, and
//! purchases using `RocksDB` with column families for efficient indexing. It
//! is the single source of truth for payment state.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `accounts`: account records, keyed by `account_id` (8 bytes, big-endian)
//! - `intents`: payment intents, keyed by `track_id` (processor string)
//! - `purchases`: purchase records, keyed by `purchase_id` (ULID)
//! - `purchases_by_account`: index for listing purchases by account
//! - `deadlines`: expiry due-times, keyed by `due_at_millis || track_id`,
//!   swept periodically so expiry tracking survives restarts
//!
//! # Example
//!
//! ```no_run
//! use kiosk_ledger::{Ledger, RocksLedger};
//! use kiosk_core::{Account, AccountId};
//!
//! let ledger = RocksLedger::open("/tmp/kiosk-db").unwrap();
//!
//! let account = Account::new(AccountId::new(42), Some("alice".into()));
//! ledger.create_account(&account).unwrap();
//!
//! let retrieved = ledger.get_account(&account.id).unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{LedgerError, Result};
pub use rocks::RocksLedger;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use kiosk_core::{Account, AccountId, IntentStatus, PackageId, PaymentIntent, Purchase, TrackId};

/// Aggregate sales statistics.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Statistics {
    /// Number of distinct accounts with at least one purchase.
    pub purchasing_accounts: u64,

    /// Sum of all purchase amounts in cents.
    pub total_revenue_cents: i64,

    /// Number of sales per package.
    pub sales_by_package: BTreeMap<PackageId, u64>,
}

/// The ledger trait defining all database operations.
///
/// Writes are durable before the call returns: a completed write survives a
/// crash immediately after.
pub trait Ledger: Send + Sync {
    // =========================================================================
    // Account Operations
    // =========================================================================

    /// Insert an account if it does not already exist.
    ///
    /// Idempotent: an existing record is preserved untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn create_account(&self, account: &Account) -> Result<()>;

    /// Get an account by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_account(&self, account_id: &AccountId) -> Result<Option<Account>>;

    /// Flag an account inactive.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` if the account doesn't exist.
    fn deactivate_account(&self, account_id: &AccountId) -> Result<()>;

    // =========================================================================
    // Payment Intent Operations
    // =========================================================================

    /// Insert a new pending payment intent.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::DuplicateTrackId` if an intent with the same
    /// track id already exists.
    fn record_intent(&self, intent: &PaymentIntent) -> Result<()>;

    /// Get a payment intent by track id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_intent(&self, track_id: &TrackId) -> Result<Option<PaymentIntent>>;

    /// Apply a status transition to a payment intent.
    ///
    /// Stamps `completed_at` when the new status is terminal. Transitions out
    /// of a terminal state are rejected and leave the record unchanged.
    ///
    /// # Errors
    ///
    /// - `LedgerError::NotFound` if the track id is unknown.
    /// - `LedgerError::InvalidTransition` if the stored status is terminal or
    ///   the new status is `Pending`.
    fn set_intent_status(&self, track_id: &TrackId, status: IntentStatus) -> Result<()>;

    // =========================================================================
    // Purchase Operations
    // =========================================================================

    /// Append a purchase record.
    ///
    /// Also maintains the per-account index, in one atomic batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn record_purchase(&self, purchase: &Purchase) -> Result<()>;

    /// List purchases for an account, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_purchases_by_account(
        &self,
        account_id: &AccountId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Purchase>>;

    /// Compute aggregate sales statistics over all purchases.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn aggregate_statistics(&self) -> Result<Statistics>;

    // =========================================================================
    // Expiry Deadline Operations
    // =========================================================================

    /// Record an expiry deadline for a track id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn record_deadline(&self, track_id: &TrackId, due_at: DateTime<Utc>) -> Result<()>;

    /// List all deadlines due at or before `now`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn due_deadlines(&self, now: DateTime<Utc>) -> Result<Vec<(DateTime<Utc>, TrackId)>>;

    /// Remove a processed deadline.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn clear_deadline(&self, track_id: &TrackId, due_at: DateTime<Utc>) -> Result<()>;
}
