//! Key encoding utilities for the `RocksDB` ledger.

use chrono::{DateTime, TimeZone, Utc};

use kiosk_core::{AccountId, PurchaseId, TrackId};

/// Create an account key from an account id.
#[must_use]
pub fn account_key(account_id: &AccountId) -> Vec<u8> {
    account_id.to_be_bytes().to_vec()
}

/// Create an intent key from a track id.
#[must_use]
pub fn intent_key(track_id: &TrackId) -> Vec<u8> {
    track_id.as_str().as_bytes().to_vec()
}

/// Create a purchase key from a purchase id.
#[must_use]
pub fn purchase_key(purchase_id: &PurchaseId) -> Vec<u8> {
    purchase_id.to_bytes().to_vec()
}

/// Create an account-purchase index key.
///
/// Format: `account_id (8 bytes BE) || purchase_id (16 bytes)`
///
/// Since ULIDs are time-ordered, purchases for an account sort by time.
#[must_use]
pub fn account_purchase_key(account_id: &AccountId, purchase_id: &PurchaseId) -> Vec<u8> {
    let mut key = Vec::with_capacity(24);
    key.extend_from_slice(&account_id.to_be_bytes());
    key.extend_from_slice(&purchase_id.to_bytes());
    key
}

/// Create a prefix for iterating all purchases for an account.
#[must_use]
pub fn account_purchases_prefix(account_id: &AccountId) -> Vec<u8> {
    account_id.to_be_bytes().to_vec()
}

/// Extract the purchase id from an account-purchase index key.
///
/// # Panics
///
/// Panics if the key is not at least 24 bytes.
#[must_use]
pub fn extract_purchase_id_from_account_key(key: &[u8]) -> PurchaseId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[8..24]);
    PurchaseId::from_bytes(bytes).expect("valid ULID bytes")
}

/// Create a deadline key.
///
/// Format: `due_at_millis (8 bytes BE) || track_id`
///
/// Big-endian ordering means a forward iteration visits deadlines oldest
/// first, so the sweeper can stop at the first key past `now`.
#[must_use]
pub fn deadline_key(due_at: DateTime<Utc>, track_id: &TrackId) -> Vec<u8> {
    let millis = u64::try_from(due_at.timestamp_millis()).unwrap_or(0);
    let mut key = Vec::with_capacity(8 + track_id.as_str().len());
    key.extend_from_slice(&millis.to_be_bytes());
    key.extend_from_slice(track_id.as_str().as_bytes());
    key
}

/// Decode a deadline key back into its due time and track id.
///
/// Returns `None` if the key is malformed.
#[must_use]
pub fn decode_deadline_key(key: &[u8]) -> Option<(DateTime<Utc>, TrackId)> {
    if key.len() < 8 {
        return None;
    }
    let mut millis_bytes = [0u8; 8];
    millis_bytes.copy_from_slice(&key[..8]);
    let millis = i64::try_from(u64::from_be_bytes(millis_bytes)).ok()?;
    let due_at = Utc.timestamp_millis_opt(millis).single()?;
    let track_id = TrackId::new(String::from_utf8(key[8..].to_vec()).ok()?);
    Some((due_at, track_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_key_length() {
        let key = account_key(&AccountId::new(42));
        assert_eq!(key.len(), 8);
    }

    #[test]
    fn account_purchase_key_format() {
        let account_id = AccountId::new(42);
        let purchase_id = PurchaseId::generate();
        let key = account_purchase_key(&account_id, &purchase_id);

        assert_eq!(key.len(), 24);
        assert_eq!(&key[..8], account_id.to_be_bytes());
        assert_eq!(&key[8..], purchase_id.to_bytes());
    }

    #[test]
    fn extract_purchase_id_roundtrip() {
        let account_id = AccountId::new(7);
        let purchase_id = PurchaseId::generate();
        let key = account_purchase_key(&account_id, &purchase_id);

        assert_eq!(extract_purchase_id_from_account_key(&key), purchase_id);
    }

    #[test]
    fn deadline_key_roundtrip() {
        let due_at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let track_id = TrackId::new("trk_abc");
        let key = deadline_key(due_at, &track_id);

        let (decoded_due, decoded_track) = decode_deadline_key(&key).unwrap();
        assert_eq!(decoded_due, due_at);
        assert_eq!(decoded_track, track_id);
    }

    #[test]
    fn deadline_keys_order_by_time() {
        let early = Utc.timestamp_millis_opt(1_000).unwrap();
        let late = Utc.timestamp_millis_opt(2_000).unwrap();
        let track = TrackId::new("t");

        assert!(deadline_key(early, &track) < deadline_key(late, &track));
    }

    #[test]
    fn decode_short_key_is_none() {
        assert!(decode_deadline_key(&[1, 2, 3]).is_none());
    }
}
