//! Earning-limit constants and the calendar-month window.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Maximum non-referral coins a user may earn per calendar month.
pub const MONTHLY_LIMIT: i64 = 1000;

/// One-time bonus credited to a referrer when the referred user completes
/// their first mining earn.
pub const REFERRAL_BONUS: i64 = 100;

/// The half-open UTC calendar-month window `[start, end)` containing `now`.
///
/// Transaction timestamps are compared against this window for monthly-limit
/// accounting.
///
/// # Panics
///
/// Never panics for valid `DateTime<Utc>` inputs; month arithmetic stays
/// within chrono's representable range.
#[must_use]
pub fn month_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .expect("first of month is always valid");

    let (next_year, next_month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    let end = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .expect("first of month is always valid");

    (start, end)
}

/// Snapshot of a user's standing against the monthly earning cap.
///
/// Computed from the transaction log at call time, never from a cached
/// counter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// Non-referral coins earned in the current calendar month.
    pub earned_this_month: i64,

    /// The monthly cap ([`MONTHLY_LIMIT`]).
    pub limit: i64,

    /// Coins still earnable this month. Saturates at zero.
    pub remaining: i64,
}

impl MonthlySummary {
    /// Build a summary from the month's non-referral earned total.
    #[must_use]
    pub fn from_earned(earned_this_month: i64) -> Self {
        Self {
            earned_this_month,
            limit: MONTHLY_LIMIT,
            remaining: (MONTHLY_LIMIT - earned_this_month).max(0),
        }
    }
}
