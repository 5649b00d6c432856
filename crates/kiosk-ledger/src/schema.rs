//! Column family definitions for the kiosk ledger.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Account records, keyed by `account_id` (8 bytes, big-endian).
    pub const ACCOUNTS: &str = "accounts";

    /// Payment intents, keyed by `track_id` (processor-issued string).
    pub const INTENTS: &str = "intents";

    /// Purchase records, keyed by `purchase_id` (ULID bytes).
    pub const PURCHASES: &str = "purchases";

    /// Index: purchases by account, keyed by `account_id || purchase_id`.
    /// Value is empty (index only).
    pub const PURCHASES_BY_ACCOUNT: &str = "purchases_by_account";

    /// Expiry deadlines, keyed by `due_at_millis (8 BE) || track_id`.
    /// Value is empty (the key carries everything the sweeper needs).
    pub const DEADLINES: &str = "deadlines";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::ACCOUNTS,
        cf::INTENTS,
        cf::PURCHASES,
        cf::PURCHASES_BY_ACCOUNT,
        cf::DEADLINES,
    ]
}
