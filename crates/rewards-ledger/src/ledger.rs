//! The `CoinLedger` and its operations.

use chrono::Utc;
use serde::Serialize;

use rewards_core::{
    month_window, CoinSource, CoinTransaction, LedgerError, MonthlySummary, ReferralProfile,
    Result, TransactionId, UserId, Wallet, MONTHLY_LIMIT, REFERRAL_BONUS,
};
use rewards_store::{Store, StoreError};

use crate::locks::{lock_recovering, UserLocks};

/// The outcome of a successful balance change.
#[derive(Debug, Clone, Serialize)]
pub struct CoinChangeReceipt {
    /// The recorded transaction.
    pub transaction_id: TransactionId,

    /// The authoritative balance after the change. UI callers render this
    /// value rather than refetching.
    pub new_balance: i64,

    /// What happened to the referral bonus, if one was due.
    pub referral_bonus: ReferralBonusOutcome,
}

/// Outcome of the referral-bonus side effect of a coin change.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ReferralBonusOutcome {
    /// No bonus was due for this change.
    NotApplicable,

    /// The referrer was credited.
    Credited {
        /// The referrer that received the bonus.
        referrer: UserId,
        /// The referrer's `Referral`-sourced transaction.
        transaction_id: TransactionId,
    },

    /// A bonus was due but the credit failed. The primary mutation stands;
    /// the failure is logged for reconciliation.
    Failed {
        /// The referrer that was not credited.
        referrer: UserId,
    },
}

/// The single authority for changing coin balances.
///
/// All mutations for a given user run under that user's lock, making the
/// read-check-write sequence (limit check, balance check, commit) atomic
/// with respect to concurrent calls for the same user. No two user locks
/// are ever held at once: the referral credit to the referrer runs under
/// the referrer's own lock only after the referee's lock is released.
pub struct CoinLedger<S: Store> {
    store: S,
    locks: UserLocks,
}

impl<S: Store> CoinLedger<S> {
    /// Create a ledger over the given store.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: UserLocks::default(),
        }
    }

    /// Register a user: create a zero-balance wallet and the referral
    /// profile.
    ///
    /// Referral edges are only settable here, and only toward an already
    /// registered user, so the referral graph stays acyclic.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::UserAlreadyExists`] if a wallet already exists.
    /// - [`LedgerError::InvalidReferral`] on self-referral or an unknown
    ///   referrer.
    /// - [`LedgerError::StoreUnavailable`] if the store fails.
    pub fn register_user(&self, user_id: UserId, referred_by: Option<UserId>) -> Result<Wallet> {
        if let Some(referrer) = referred_by {
            if referrer == user_id {
                return Err(LedgerError::InvalidReferral("self-referral".into()));
            }
            if self
                .store
                .get_wallet(&referrer)
                .map_err(store_unavailable)?
                .is_none()
            {
                return Err(LedgerError::InvalidReferral(format!(
                    "referrer not registered: {referrer}"
                )));
            }
        }

        let lock = self.locks.for_user(user_id);
        let _guard = lock_recovering(&lock);

        if self
            .store
            .get_wallet(&user_id)
            .map_err(store_unavailable)?
            .is_some()
        {
            return Err(LedgerError::UserAlreadyExists {
                user_id: user_id.to_string(),
            });
        }

        let profile = ReferralProfile::new(user_id, referred_by);
        self.store.put_profile(&profile).map_err(store_unavailable)?;

        // The wallet write is the registration signal; a profile without a
        // wallet is overwritten on retry.
        let wallet = Wallet::new(user_id);
        self.store.put_wallet(&wallet).map_err(store_unavailable)?;

        tracing::info!(user_id = %user_id, referred_by = ?referred_by, "User registered");

        Ok(wallet)
    }

    /// Apply a balance change: positive `amount` earns, negative spends.
    ///
    /// On success the wallet update and the transaction record land in one
    /// atomic store write, and the receipt carries the authoritative new
    /// balance. Validation failures leave no trace in the store.
    ///
    /// If this is the user's first mining earn and their profile names a
    /// referrer, the referrer is credited [`REFERRAL_BONUS`] coins after
    /// the primary mutation commits. That credit is cap-exempt and does not
    /// chain to the referrer's own referrer. If it fails, the primary
    /// mutation is not rolled back; the receipt reports
    /// [`ReferralBonusOutcome::Failed`].
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] if `amount == 0`.
    /// - [`LedgerError::UserNotFound`] if no wallet exists.
    /// - [`LedgerError::MonthlyLimitExceeded`] if a non-referral earn would
    ///   push this month's earnings past [`MONTHLY_LIMIT`].
    /// - [`LedgerError::InsufficientBalance`] if a spend would drive the
    ///   balance negative.
    /// - [`LedgerError::StoreUnavailable`] if the store fails; no partial
    ///   mutation is left behind.
    pub fn apply_coin_change(
        &self,
        user_id: UserId,
        amount: i64,
        source: CoinSource,
        description: &str,
    ) -> Result<CoinChangeReceipt> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount(
                "amount must be non-zero".into(),
            ));
        }
        // Rejects i64::MIN; every later negation/abs on `amount` is safe.
        let magnitude = amount
            .checked_abs()
            .ok_or_else(|| LedgerError::InvalidAmount("amount out of range".into()))?;

        let lock = self.locks.for_user(user_id);

        // Everything inside this scope is serialized per user; the guard is
        // dropped before any referrer work begins.
        let (transaction_id, new_balance, bonus_due) = {
            let _guard = lock_recovering(&lock);

            let mut wallet = self
                .store
                .get_wallet(&user_id)
                .map_err(store_unavailable)?
                .ok_or_else(|| LedgerError::UserNotFound {
                    user_id: user_id.to_string(),
                })?;

            if amount > 0 && source != CoinSource::Referral {
                let (start, end) = month_window(Utc::now());
                let earned = self
                    .store
                    .sum_earned_in_range(&user_id, start, end)
                    .map_err(store_unavailable)?;

                // An amount large enough to overflow the running total is
                // over the cap a fortiori.
                if earned
                    .checked_add(amount)
                    .map_or(true, |total| total > MONTHLY_LIMIT)
                {
                    return Err(LedgerError::MonthlyLimitExceeded {
                        earned,
                        attempted: amount,
                        limit: MONTHLY_LIMIT,
                    });
                }
            }

            let new_balance = wallet.balance.checked_add(amount).ok_or_else(|| {
                LedgerError::InvalidAmount("amount overflows the balance".into())
            })?;
            if new_balance < 0 {
                return Err(LedgerError::InsufficientBalance {
                    balance: wallet.balance,
                    required: magnitude,
                });
            }

            // Referral eligibility is decided here, against the log and
            // inside the critical section, so concurrent first-mining earns
            // cannot both qualify.
            let bonus_due = if source == CoinSource::Mining
                && amount > 0
                && !self
                    .store
                    .has_earned_from_source(&user_id, &CoinSource::Mining)
                    .map_err(store_unavailable)?
            {
                self.store
                    .get_profile(&user_id)
                    .map_err(store_unavailable)?
                    .and_then(|profile| profile.referred_by)
            } else {
                None
            };

            wallet.balance = new_balance;
            if amount > 0 {
                wallet.lifetime_earned = wallet.lifetime_earned.saturating_add(amount);
            } else {
                wallet.lifetime_spent = wallet.lifetime_spent.saturating_add(magnitude);
            }
            wallet.updated_at = Utc::now();

            tracing::debug!(
                user_id = %user_id,
                amount = %amount,
                source = %source,
                new_balance = %wallet.balance,
                "Committing coin change"
            );

            let transaction = if amount > 0 {
                CoinTransaction::earned(
                    user_id,
                    amount,
                    source,
                    description.to_owned(),
                    wallet.balance,
                )
            } else {
                CoinTransaction::spent(
                    user_id,
                    amount,
                    source,
                    description.to_owned(),
                    wallet.balance,
                )
            };

            self.store
                .commit_change(&wallet, &transaction)
                .map_err(store_unavailable)?;

            (transaction.id, wallet.balance, bonus_due)
        };

        let referral_bonus = match bonus_due {
            None => ReferralBonusOutcome::NotApplicable,
            Some(referrer) => self.credit_referrer(referrer, user_id),
        };

        Ok(CoinChangeReceipt {
            transaction_id,
            new_balance,
            referral_bonus,
        })
    }

    /// The user's standing against the monthly cap, computed from the
    /// transaction log at call time. Pure read.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::UserNotFound`] if no wallet exists.
    /// - [`LedgerError::StoreUnavailable`] if the store fails.
    pub fn get_monthly_summary(&self, user_id: UserId) -> Result<MonthlySummary> {
        self.require_wallet(&user_id)?;

        let (start, end) = month_window(Utc::now());
        let earned = self
            .store
            .sum_earned_in_range(&user_id, start, end)
            .map_err(store_unavailable)?;

        Ok(MonthlySummary::from_earned(earned))
    }

    /// The user's most recent transactions, newest first. Pure read.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::UserNotFound`] if no wallet exists.
    /// - [`LedgerError::StoreUnavailable`] if the store fails.
    pub fn get_recent_transactions(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<CoinTransaction>> {
        self.require_wallet(&user_id)?;

        self.store
            .list_transactions_by_user(&user_id, limit, 0)
            .map_err(store_unavailable)
    }

    /// The user's wallet snapshot. Pure read.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::UserNotFound`] if no wallet exists.
    /// - [`LedgerError::StoreUnavailable`] if the store fails.
    pub fn get_wallet(&self, user_id: UserId) -> Result<Wallet> {
        self.require_wallet(&user_id)
    }

    fn require_wallet(&self, user_id: &UserId) -> Result<Wallet> {
        self.store
            .get_wallet(user_id)
            .map_err(store_unavailable)?
            .ok_or_else(|| LedgerError::UserNotFound {
                user_id: user_id.to_string(),
            })
    }

    /// Credit the one-time referral bonus to `referrer`.
    ///
    /// Runs under the referrer's lock only; the referee's lock has already
    /// been released. Best-effort: a failure is logged and reported in the
    /// receipt, never propagated, so the referee's own earn is never lost
    /// to a downstream bonus failure.
    fn credit_referrer(&self, referrer: UserId, referee: UserId) -> ReferralBonusOutcome {
        match self.try_credit_referrer(referrer, referee) {
            Ok(transaction_id) => {
                tracing::info!(
                    referrer = %referrer,
                    referee = %referee,
                    bonus = %REFERRAL_BONUS,
                    "Referral bonus credited"
                );
                ReferralBonusOutcome::Credited {
                    referrer,
                    transaction_id,
                }
            }
            Err(err) => {
                let err = LedgerError::ReferralCreditFailed {
                    referrer: referrer.to_string(),
                    reason: err.to_string(),
                };
                tracing::warn!(referee = %referee, error = %err, "Referral bonus not credited");
                ReferralBonusOutcome::Failed { referrer }
            }
        }
    }

    fn try_credit_referrer(&self, referrer: UserId, referee: UserId) -> Result<TransactionId> {
        let lock = self.locks.for_user(referrer);
        let _guard = lock_recovering(&lock);

        let mut wallet = self.require_wallet(&referrer)?;

        wallet.balance = wallet.balance.checked_add(REFERRAL_BONUS).ok_or_else(|| {
            LedgerError::InvalidAmount("bonus overflows the referrer balance".into())
        })?;
        wallet.lifetime_earned = wallet.lifetime_earned.saturating_add(REFERRAL_BONUS);
        wallet.updated_at = Utc::now();

        // Referral-sourced, so cap-exempt; the referrer's own referrer is
        // deliberately not consulted here.
        let transaction = CoinTransaction::earned(
            referrer,
            REFERRAL_BONUS,
            CoinSource::Referral,
            format!("Referral bonus for referring {referee}"),
            wallet.balance,
        );

        self.store
            .commit_change(&wallet, &transaction)
            .map_err(store_unavailable)?;

        Ok(transaction.id)
    }
}

fn store_unavailable(err: StoreError) -> LedgerError {
    LedgerError::StoreUnavailable(err.to_string())
}
