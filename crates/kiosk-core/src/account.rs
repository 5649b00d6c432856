//! Account types for kiosk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AccountId;

/// A storefront account for a chat user.
///
/// Accounts are created on first interaction and never deleted; the only
/// later mutation is flagging the account inactive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// The account id (from the chat platform).
    pub id: AccountId,

    /// Display name reported by the platform, if any.
    pub display_name: Option<String>,

    /// Whether the account is active.
    pub is_active: bool,

    /// When the account was first seen.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a new active account.
    #[must_use]
    pub fn new(id: AccountId, display_name: Option<String>) -> Self {
        Self {
            id,
            display_name,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_is_active() {
        let account = Account::new(AccountId::new(7), Some("alice".into()));
        assert!(account.is_active);
        assert_eq!(account.display_name.as_deref(), Some("alice"));
    }
}
