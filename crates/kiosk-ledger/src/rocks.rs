//! `RocksDB` ledger implementation.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use kiosk_core::{Account, AccountId, IntentStatus, PaymentIntent, Purchase, TrackId};

use crate::error::{LedgerError, Result};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{Ledger, Statistics};

/// RocksDB-backed ledger implementation.
pub struct RocksLedger {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksLedger {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| LedgerError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    fn get_purchase(&self, key: &[u8]) -> Result<Option<Purchase>> {
        let cf = self.cf(cf::PURCHASES)?;
        self.db
            .get_cf(&cf, key)
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }
}

impl Ledger for RocksLedger {
    // =========================================================================
    // Account Operations
    // =========================================================================

    fn create_account(&self, account: &Account) -> Result<()> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(&account.id);

        // Idempotent upsert: first interaction wins, later ones are no-ops.
        let exists = self
            .db
            .get_cf(&cf, &key)
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .is_some();
        if exists {
            return Ok(());
        }

        let value = Self::serialize(account)?;
        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_account(&self, account_id: &AccountId) -> Result<Option<Account>> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(account_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn deactivate_account(&self, account_id: &AccountId) -> Result<()> {
        let cf = self.cf(cf::ACCOUNTS)?;
        let key = keys::account_key(account_id);

        let mut account = self
            .get_account(account_id)?
            .ok_or_else(|| LedgerError::NotFound {
                entity: "account",
                id: account_id.to_string(),
            })?;

        account.is_active = false;

        let value = Self::serialize(&account)?;
        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(())
    }

    // =========================================================================
    // Payment Intent Operations
    // =========================================================================

    fn record_intent(&self, intent: &PaymentIntent) -> Result<()> {
        let cf = self.cf(cf::INTENTS)?;
        let key = keys::intent_key(&intent.track_id);

        let exists = self
            .db
            .get_cf(&cf, &key)
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .is_some();
        if exists {
            return Err(LedgerError::DuplicateTrackId {
                track_id: intent.track_id.to_string(),
            });
        }

        let value = Self::serialize(intent)?;
        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_intent(&self, track_id: &TrackId) -> Result<Option<PaymentIntent>> {
        let cf = self.cf(cf::INTENTS)?;
        let key = keys::intent_key(track_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn set_intent_status(&self, track_id: &TrackId, status: IntentStatus) -> Result<()> {
        let cf = self.cf(cf::INTENTS)?;
        let key = keys::intent_key(track_id);

        let mut intent = self.get_intent(track_id)?.ok_or_else(|| LedgerError::NotFound {
            entity: "intent",
            id: track_id.to_string(),
        })?;

        // Transitions are monotone forward: terminal states never change and
        // nothing re-enters pending.
        if intent.status.is_terminal() || status == IntentStatus::Pending {
            return Err(LedgerError::InvalidTransition {
                track_id: track_id.to_string(),
                from: intent.status.to_string(),
                to: status.to_string(),
            });
        }

        intent.status = status;
        if status.is_terminal() {
            intent.completed_at = Some(Utc::now());
        }

        let value = Self::serialize(&intent)?;
        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(())
    }

    // =========================================================================
    // Purchase Operations
    // =========================================================================

    fn record_purchase(&self, purchase: &Purchase) -> Result<()> {
        let cf_purchases = self.cf(cf::PURCHASES)?;
        let cf_by_account = self.cf(cf::PURCHASES_BY_ACCOUNT)?;

        let purchase_key = keys::purchase_key(&purchase.id);
        let index_key = keys::account_purchase_key(&purchase.account_id, &purchase.id);
        let value = Self::serialize(purchase)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_purchases, &purchase_key, &value);
        batch.put_cf(&cf_by_account, &index_key, []); // Index entry (empty value)

        self.db
            .write(batch)
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(())
    }

    fn list_purchases_by_account(
        &self,
        account_id: &AccountId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Purchase>> {
        let cf_by_account = self.cf(cf::PURCHASES_BY_ACCOUNT)?;
        let prefix = keys::account_purchases_prefix(account_id);

        let iter = self.db.iterator_cf(
            &cf_by_account,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        // Collect matching index keys; ULID suffixes are time-ordered.
        let mut all_keys: Vec<Vec<u8>> = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| LedgerError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            all_keys.push(key.to_vec());
        }

        // Reverse to get newest first.
        all_keys.reverse();

        let mut purchases = Vec::new();
        for key in all_keys.into_iter().skip(offset) {
            if purchases.len() >= limit {
                break;
            }

            let purchase_id = keys::extract_purchase_id_from_account_key(&key);
            if let Some(purchase) = self.get_purchase(&keys::purchase_key(&purchase_id))? {
                purchases.push(purchase);
            }
        }

        Ok(purchases)
    }

    fn aggregate_statistics(&self) -> Result<Statistics> {
        let cf = self.cf(cf::PURCHASES)?;

        let mut accounts = std::collections::BTreeSet::new();
        let mut total_revenue_cents = 0i64;
        let mut sales_by_package = std::collections::BTreeMap::new();

        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_, value) = item.map_err(|e| LedgerError::Database(e.to_string()))?;
            let purchase: Purchase = Self::deserialize(&value)?;

            accounts.insert(purchase.account_id);
            total_revenue_cents += purchase.amount_cents;
            *sales_by_package.entry(purchase.package_id).or_insert(0u64) += 1;
        }

        Ok(Statistics {
            purchasing_accounts: accounts.len() as u64,
            total_revenue_cents,
            sales_by_package,
        })
    }

    // =========================================================================
    // Expiry Deadline Operations
    // =========================================================================

    fn record_deadline(&self, track_id: &TrackId, due_at: DateTime<Utc>) -> Result<()> {
        let cf = self.cf(cf::DEADLINES)?;
        let key = keys::deadline_key(due_at, track_id);

        self.db
            .put_cf(&cf, key, [])
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(())
    }

    fn due_deadlines(&self, now: DateTime<Utc>) -> Result<Vec<(DateTime<Utc>, TrackId)>> {
        let cf = self.cf(cf::DEADLINES)?;

        let mut due = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (key, _) = item.map_err(|e| LedgerError::Database(e.to_string()))?;

            let Some((due_at, track_id)) = keys::decode_deadline_key(&key) else {
                tracing::warn!(key = ?key, "skipping malformed deadline key");
                continue;
            };

            // Keys sort by due time, so the first future deadline ends the scan.
            if due_at > now {
                break;
            }

            due.push((due_at, track_id));
        }

        Ok(due)
    }

    fn clear_deadline(&self, track_id: &TrackId, due_at: DateTime<Utc>) -> Result<()> {
        let cf = self.cf(cf::DEADLINES)?;
        let key = keys::deadline_key(due_at, track_id);

        self.db
            .delete_cf(&cf, key)
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(())
    }
}
