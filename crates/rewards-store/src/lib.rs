//! `RocksDB` storage layer for the rewards coin ledger.
//!
//! This crate provides persistent storage for wallets, transactions, and
//! referral profiles using `RocksDB` with column families for efficient
//! indexing.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `wallets`: Wallet records, keyed by `user_id`
//! - `transactions`: Coin transactions, keyed by `transaction_id` (ULID)
//! - `transactions_by_user`: Index for listing transactions by user
//! - `profiles`: Referral profiles, keyed by `user_id`
//!
//! The aggregate queries (`sum_earned_in_range`, `has_earned_from_source`)
//! are computed by scanning the per-user index, never from cached counters;
//! the transaction log is the source of truth for limit accounting and
//! referral eligibility.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use chrono::{DateTime, Utc};
use rewards_core::{CoinSource, CoinTransaction, ReferralProfile, TransactionId, UserId, Wallet};

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer so the ledger can be tested
/// against alternative backends.
pub trait Store: Send + Sync {
    // =========================================================================
    // Wallet Operations
    // =========================================================================

    /// Insert or update a wallet record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_wallet(&self, wallet: &Wallet) -> Result<()>;

    /// Get a wallet by user id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_wallet(&self, user_id: &UserId) -> Result<Option<Wallet>>;

    // =========================================================================
    // Profile Operations
    // =========================================================================

    /// Insert a referral profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_profile(&self, profile: &ReferralProfile) -> Result<()>;

    /// Get a referral profile by user id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_profile(&self, user_id: &UserId) -> Result<Option<ReferralProfile>>;

    // =========================================================================
    // Transaction Operations
    // =========================================================================

    /// Get a transaction by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_transaction(&self, transaction_id: &TransactionId) -> Result<Option<CoinTransaction>>;

    /// List transactions for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_transactions_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CoinTransaction>>;

    /// Sum the `Earned` transaction amounts with `source != Referral` whose
    /// `created_at` falls within `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn sum_earned_in_range(
        &self,
        user_id: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64>;

    /// Whether any `Earned` transaction from `source` exists for the user.
    ///
    /// Used for the one-time referral trigger: eligibility is decided from
    /// the immutable log, never from a client-supplied flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn has_earned_from_source(&self, user_id: &UserId, source: &CoinSource) -> Result<bool>;

    // =========================================================================
    // Compound Operations
    // =========================================================================

    /// Commit a balance change: wallet upsert, transaction insert, and
    /// user-index insert in a single atomic write.
    ///
    /// Either all three land or none do; callers never observe a wallet
    /// that disagrees with the transaction log.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn commit_change(&self, wallet: &Wallet, transaction: &CoinTransaction) -> Result<()>;
}
