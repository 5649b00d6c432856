//! Identifier types for kiosk.
//!
//! This module provides strongly-typed identifiers for accounts, payment
//! tracks, packages, and purchases.
//!
//! `AccountId` wraps the chat platform's numeric user id. `TrackId` wraps the
//! payment processor's opaque string reference and is the join key between
//! internal state and the processor's callbacks. `PurchaseId` is a ULID so
//! purchase records sort chronologically in the ledger.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// An account identifier.
///
/// Account ids are issued by the chat platform and treated as opaque; the
/// numeric representation is preserved for compact ledger keys.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(i64);

impl AccountId {
    /// Create an account id from the platform's raw numeric id.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Return the raw numeric id.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Return the big-endian bytes of the id (8 bytes), for ledger keys.
    #[must_use]
    pub const fn to_be_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl FromStr for AccountId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Self).map_err(|_| IdError::InvalidAccountId)
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for AccountId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// A payment track identifier issued by the external processor.
///
/// Track ids are globally unique per invoice and arrive back on webhook
/// callbacks. The processor documents them as opaque strings.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    /// Create a track id from the processor-issued string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Return the track id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrackId({})", self.0)
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TrackId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for TrackId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl AsRef<[u8]> for TrackId {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// A package identifier from the catalog (e.g. `"100_videos"`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageId(String);

impl PackageId {
    /// Create a package id.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Return the package id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackageId({})", self.0)
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PackageId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// A purchase record identifier using ULID for time-ordering.
///
/// Purchase ids are time-ordered so the ledger's account index yields
/// chronological listings without a separate sort key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PurchaseId(Ulid);

impl PurchaseId {
    /// Generate a new `PurchaseId` with the current timestamp.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    /// Return the bytes of the ULID (16 bytes).
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 16] {
        self.0.to_bytes()
    }

    /// Create a `PurchaseId` from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are invalid.
    pub fn from_bytes(bytes: [u8; 16]) -> Result<Self, IdError> {
        Ok(Self(Ulid::from_bytes(bytes)))
    }
}

impl FromStr for PurchaseId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ulid = Ulid::from_string(s).map_err(|_| IdError::InvalidUlid)?;
        Ok(Self(ulid))
    }
}

impl fmt::Debug for PurchaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PurchaseId({})", self.0)
    }
}

impl fmt::Display for PurchaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for PurchaseId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PurchaseId> for String {
    fn from(id: PurchaseId) -> Self {
        id.0.to_string()
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is not a valid numeric account id.
    #[error("invalid account id format")]
    InvalidAccountId,

    /// The input is not a valid ULID.
    #[error("invalid ULID format")]
    InvalidUlid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_roundtrip() {
        let id = AccountId::new(987_654_321);
        let parsed = AccountId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn account_id_serde_json() {
        let id = AccountId::new(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "42");
        let parsed: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn account_id_rejects_garbage() {
        assert_eq!(AccountId::from_str("not-a-number"), Err(IdError::InvalidAccountId));
    }

    #[test]
    fn track_id_serde_is_transparent() {
        let id = TrackId::new("trk_0123456789");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"trk_0123456789\"");
        let parsed: TrackId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn purchase_id_roundtrip() {
        let id = PurchaseId::generate();
        let parsed = PurchaseId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn purchase_id_bytes_roundtrip() {
        let id = PurchaseId::generate();
        let parsed = PurchaseId::from_bytes(id.to_bytes()).unwrap();
        assert_eq!(id, parsed);
    }
}
