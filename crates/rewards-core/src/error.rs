//! Error types for ledger operations.

use crate::ids::IdError;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur in ledger operations.
///
/// Validation failures (`MonthlyLimitExceeded`, `InsufficientBalance`,
/// `InvalidAmount`) are computed before any write and never leave partial
/// state. `StoreUnavailable` during the write phase likewise leaves the
/// wallet and transaction log in their pre-operation state.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// No wallet exists for the given user id.
    #[error("user not found: {user_id}")]
    UserNotFound {
        /// The user id that did not resolve.
        user_id: String,
    },

    /// A wallet already exists for the given user id.
    #[error("user already registered: {user_id}")]
    UserAlreadyExists {
        /// The user id that was already registered.
        user_id: String,
    },

    /// The earn would exceed the monthly non-referral cap.
    #[error("monthly limit exceeded: earned={earned}, attempted={attempted}, limit={limit}")]
    MonthlyLimitExceeded {
        /// Non-referral coins already earned this month.
        earned: i64,
        /// The amount that was attempted.
        attempted: i64,
        /// The monthly cap.
        limit: i64,
    },

    /// The spend would drive the balance negative.
    #[error("insufficient balance: balance={balance}, required={required}")]
    InsufficientBalance {
        /// Current balance.
        balance: i64,
        /// Coins required by the spend.
        required: i64,
    },

    /// The caller passed a zero amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The referral attribution was rejected at registration.
    #[error("invalid referral: {0}")]
    InvalidReferral(String),

    /// The underlying store failed or timed out. Transient; the whole
    /// operation is safe to retry.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// The referrer payout failed after the primary mutation committed.
    /// Logged and reported in the receipt; never the operation result.
    #[error("referral credit failed for referrer {referrer}: {reason}")]
    ReferralCreditFailed {
        /// The referrer that was not credited.
        referrer: String,
        /// Why the credit failed.
        reason: String,
    },

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),
}
