//! Wallet types for the coin ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// A per-user coin wallet.
///
/// The wallet is owned exclusively by the ledger: every balance change goes
/// through the ledger's `apply_coin_change` and lands together with its
/// transaction record. The balance always equals the signed sum of the
/// user's transaction log and never goes negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    /// The owning user.
    pub user_id: UserId,

    /// Current coin balance. Always >= 0.
    pub balance: i64,

    /// Lifetime coins earned (all sources, including referral bonuses).
    pub lifetime_earned: i64,

    /// Lifetime coins spent.
    pub lifetime_spent: i64,

    /// When the wallet was created.
    pub created_at: DateTime<Utc>,

    /// When the wallet was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Create a new wallet with a zero balance.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            balance: 0,
            lifetime_earned: 0,
            lifetime_spent: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether a spend of `amount` coins would be covered.
    #[must_use]
    pub fn can_spend(&self, amount: i64) -> bool {
        self.balance >= amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_wallet_is_empty() {
        let wallet = Wallet::new(UserId::generate());
        assert_eq!(wallet.balance, 0);
        assert_eq!(wallet.lifetime_earned, 0);
        assert_eq!(wallet.lifetime_spent, 0);
    }

    #[test]
    fn can_spend_boundary() {
        let mut wallet = Wallet::new(UserId::generate());
        wallet.balance = 100;

        assert!(wallet.can_spend(99));
        assert!(wallet.can_spend(100));
        assert!(!wallet.can_spend(101));
    }
}
