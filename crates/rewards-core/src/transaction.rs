//! Coin transaction types.
//!
//! Every balance change creates exactly one transaction record. Records are
//! append-only and never mutated or deleted; they are the source of truth
//! for monthly-limit accounting and referral-bonus eligibility.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{TransactionId, UserId};

/// An immutable audit record of a single balance change.
///
/// `amount` is always positive; the direction is carried by
/// [`TransactionType`]. ULID ids make records naturally time-ordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinTransaction {
    /// Unique transaction id (ULID, time-ordered).
    pub id: TransactionId,

    /// The user whose balance changed.
    pub user_id: UserId,

    /// Magnitude of the change in coins. Always positive.
    pub amount: i64,

    /// Direction of the change.
    pub transaction_type: TransactionType,

    /// The activity that produced this change.
    pub source: CoinSource,

    /// Free-text audit note. May be empty.
    pub description: String,

    /// Wallet balance after this transaction was applied.
    pub balance_after: i64,

    /// When the transaction was created. Immutable; drives the
    /// calendar-month window for limit accounting.
    pub created_at: DateTime<Utc>,
}

impl CoinTransaction {
    /// Create an earning record.
    #[must_use]
    pub fn earned(
        user_id: UserId,
        amount: i64,
        source: CoinSource,
        description: String,
        balance_after: i64,
    ) -> Self {
        Self {
            id: TransactionId::generate(),
            user_id,
            amount: amount.saturating_abs(),
            transaction_type: TransactionType::Earned,
            source,
            description,
            balance_after,
            created_at: Utc::now(),
        }
    }

    /// Create a spending record.
    #[must_use]
    pub fn spent(
        user_id: UserId,
        amount: i64,
        source: CoinSource,
        description: String,
        balance_after: i64,
    ) -> Self {
        Self {
            id: TransactionId::generate(),
            user_id,
            amount: amount.saturating_abs(),
            transaction_type: TransactionType::Spent,
            source,
            description,
            balance_after,
            created_at: Utc::now(),
        }
    }

    /// The signed balance delta this transaction represents.
    #[must_use]
    pub const fn signed_amount(&self) -> i64 {
        match self.transaction_type {
            TransactionType::Earned => self.amount,
            TransactionType::Spent => -self.amount,
        }
    }

    /// Whether this record counts against the monthly earning cap.
    ///
    /// Only non-referral earnings are capped; spends and referral bonuses
    /// are exempt.
    #[must_use]
    pub fn counts_toward_monthly_limit(&self) -> bool {
        self.transaction_type == TransactionType::Earned && self.source != CoinSource::Referral
    }
}

/// Direction of a balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Coins added to the wallet.
    Earned,

    /// Coins removed from the wallet.
    Spent,
}

/// The activity that produced a transaction.
///
/// The taxonomy is open: sources the ledger does not know about round-trip
/// through [`CoinSource::Other`] so that new activities can be introduced
/// without a ledger release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CoinSource {
    /// Daily mining session.
    Mining,
    /// Quiz completion.
    Quiz,
    /// Spin wheel.
    SpinWheel,
    /// Task completion.
    Task,
    /// Daily login reward.
    DailyReward,
    /// Mini game.
    MiniGame,
    /// One-time referral bonus credited to the referrer.
    Referral,
    /// Gift card or gadget redemption.
    Redemption,
    /// A source this build does not know about.
    Other(String),
}

impl CoinSource {
    /// The canonical wire name for this source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Mining => "mining",
            Self::Quiz => "quiz",
            Self::SpinWheel => "spin_wheel",
            Self::Task => "task",
            Self::DailyReward => "daily_reward",
            Self::MiniGame => "mini_game",
            Self::Referral => "referral",
            Self::Redemption => "redemption",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for CoinSource {
    fn from(value: String) -> Self {
        match value.as_str() {
            "mining" => Self::Mining,
            "quiz" => Self::Quiz,
            "spin_wheel" => Self::SpinWheel,
            "task" => Self::Task,
            "daily_reward" => Self::DailyReward,
            "mini_game" => Self::MiniGame,
            "referral" => Self::Referral,
            "redemption" => Self::Redemption,
            _ => Self::Other(value),
        }
    }
}

impl From<CoinSource> for String {
    fn from(source: CoinSource) -> Self {
        source.as_str().to_owned()
    }
}

impl std::fmt::Display for CoinSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earned_amount_is_positive() {
        let tx = CoinTransaction::earned(
            UserId::generate(),
            -50,
            CoinSource::Quiz,
            "Quiz reward".into(),
            50,
        );
        assert_eq!(tx.amount, 50);
        assert_eq!(tx.signed_amount(), 50);
    }

    #[test]
    fn spent_signed_amount_is_negative() {
        let tx = CoinTransaction::spent(
            UserId::generate(),
            200,
            CoinSource::Redemption,
            "Gift card".into(),
            800,
        );
        assert_eq!(tx.amount, 200);
        assert_eq!(tx.signed_amount(), -200);
    }

    #[test]
    fn extreme_amounts_do_not_panic() {
        let tx = CoinTransaction::spent(
            UserId::generate(),
            i64::MIN,
            CoinSource::Redemption,
            String::new(),
            0,
        );
        assert_eq!(tx.amount, i64::MAX);
    }

    #[test]
    fn referral_earnings_are_cap_exempt() {
        let user = UserId::generate();
        let referral =
            CoinTransaction::earned(user, 100, CoinSource::Referral, String::new(), 100);
        let task = CoinTransaction::earned(user, 100, CoinSource::Task, String::new(), 200);
        let spend = CoinTransaction::spent(user, 50, CoinSource::Redemption, String::new(), 150);

        assert!(!referral.counts_toward_monthly_limit());
        assert!(task.counts_toward_monthly_limit());
        assert!(!spend.counts_toward_monthly_limit());
    }

    #[test]
    fn source_roundtrips_known_names() {
        let source: CoinSource = serde_json::from_str("\"spin_wheel\"").unwrap();
        assert_eq!(source, CoinSource::SpinWheel);
        assert_eq!(serde_json::to_string(&source).unwrap(), "\"spin_wheel\"");
    }

    #[test]
    fn source_preserves_unknown_names() {
        let source: CoinSource = serde_json::from_str("\"treasure_hunt\"").unwrap();
        assert_eq!(source, CoinSource::Other("treasure_hunt".into()));
        assert_eq!(serde_json::to_string(&source).unwrap(), "\"treasure_hunt\"");
    }
}
