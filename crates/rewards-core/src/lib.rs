//! Core types for the rewards coin ledger.
//!
//! This crate provides the foundational types shared by the ledger, the
//! storage layer, and the HTTP service:
//!
//! - **Identifiers**: [`UserId`], [`TransactionId`]
//! - **Wallets**: [`Wallet`]
//! - **Transactions**: [`CoinTransaction`], [`TransactionType`], [`CoinSource`]
//! - **Profiles**: [`ReferralProfile`]
//! - **Limits**: [`MONTHLY_LIMIT`], [`REFERRAL_BONUS`], [`month_window`]
//!
//! # Coins
//!
//! Coins are whole-number units earned through platform activities (mining,
//! quizzes, spin wheels, tasks) and spent on redemptions. Balances are stored
//! as `i64` and are never allowed to go negative. Non-referral earnings are
//! capped at [`MONTHLY_LIMIT`] coins per calendar month.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod limits;
pub mod profile;
pub mod transaction;
pub mod wallet;

pub use error::{LedgerError, Result};
pub use ids::{IdError, TransactionId, UserId};
pub use limits::{month_window, MonthlySummary, MONTHLY_LIMIT, REFERRAL_BONUS};
pub use profile::ReferralProfile;
pub use transaction::{CoinSource, CoinTransaction, TransactionType};
pub use wallet::Wallet;
