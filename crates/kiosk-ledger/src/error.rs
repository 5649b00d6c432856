//! Error types for kiosk ledger operations.

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur in ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The entity kind (account, intent).
        entity: &'static str,
        /// The key that was not found.
        id: String,
    },

    /// A payment intent with this track id already exists.
    ///
    /// Track ids are processor-issued and globally unique; a collision is an
    /// integrity violation, never silently overwritten.
    #[error("duplicate track id: {track_id}")]
    DuplicateTrackId {
        /// The colliding track id.
        track_id: String,
    },

    /// Attempted transition out of a terminal status.
    #[error("invalid transition for {track_id}: {from} -> {to}")]
    InvalidTransition {
        /// The affected track id.
        track_id: String,
        /// The stored status.
        from: String,
        /// The rejected new status.
        to: String,
    },
}
