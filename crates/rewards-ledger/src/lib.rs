//! The coin ledger.
//!
//! This crate is the single authority for changing a user's coin balance.
//! Every mutation records an immutable transaction, enforces the monthly
//! non-referral earning cap, and triggers the one-time referral bonus when
//! a referred user completes their first mining earn.
//!
//! # Guarantees
//!
//! - The wallet balance always equals the signed sum of the user's
//!   transaction log, including under concurrent callers.
//! - A spend never drives the balance negative.
//! - Non-referral earnings never exceed [`MONTHLY_LIMIT`] coins per
//!   calendar month; referral earnings are uncapped.
//! - The referral bonus fires exactly once per referred user.
//! - Mutations for the same user are serialized against one another;
//!   different users never contend.
//!
//! [`MONTHLY_LIMIT`]: rewards_core::MONTHLY_LIMIT

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod ledger;
mod locks;

pub use ledger::{CoinChangeReceipt, CoinLedger, ReferralBonusOutcome};
