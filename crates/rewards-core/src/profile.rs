//! Referral profile types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Referral attribution for a user, written once at registration.
///
/// The ledger reads `referred_by` exactly once, when the user's first
/// mining earn lands, to decide whether a referral bonus is owed. Referral
/// edges are only ever set at registration, so the referral graph is
/// acyclic by construction (self-referral is rejected at registration).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralProfile {
    /// The user this profile belongs to.
    pub user_id: UserId,

    /// The user who referred this one, if any.
    pub referred_by: Option<UserId>,

    /// When the profile was created.
    pub created_at: DateTime<Utc>,
}

impl ReferralProfile {
    /// Create a profile at registration time.
    #[must_use]
    pub fn new(user_id: UserId, referred_by: Option<UserId>) -> Self {
        Self {
            user_id,
            referred_by,
            created_at: Utc::now(),
        }
    }
}
