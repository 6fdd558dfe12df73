//! Coin change, monthly summary, and transaction history handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use rewards_core::{CoinSource, CoinTransaction, MonthlySummary, UserId};
use rewards_ledger::ReferralBonusOutcome;

use crate::auth::ServiceAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Coin change request.
#[derive(Debug, Deserialize)]
pub struct CoinChangeRequest {
    /// The user whose balance changes.
    pub user_id: UserId,
    /// Signed change: positive earns, negative spends. Must be non-zero.
    pub amount: i64,
    /// The activity that produced the change.
    pub source: CoinSource,
    /// Audit note. May be empty.
    #[serde(default)]
    pub description: String,
}

/// Coin change response.
#[derive(Debug, Serialize)]
pub struct CoinChangeResponse {
    /// The recorded transaction.
    pub transaction_id: String,
    /// The authoritative balance after the change.
    pub new_balance: i64,
    /// The referral-bonus outcome for this change.
    pub referral_bonus: ReferralBonusOutcome,
}

/// Apply a coin change through the ledger.
pub async fn apply_change(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Json(body): Json<CoinChangeRequest>,
) -> Result<Json<CoinChangeResponse>, ApiError> {
    let receipt = state.ledger.apply_coin_change(
        body.user_id,
        body.amount,
        body.source,
        &body.description,
    )?;

    Ok(Json(CoinChangeResponse {
        transaction_id: receipt.transaction_id.to_string(),
        new_balance: receipt.new_balance,
        referral_bonus: receipt.referral_bonus,
    }))
}

/// Get the user's standing against the monthly earning cap.
pub async fn monthly_summary(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(user_id): Path<UserId>,
) -> Result<Json<MonthlySummary>, ApiError> {
    let summary = state.ledger.get_monthly_summary(user_id)?;

    Ok(Json(summary))
}

/// Transaction list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Maximum number of transactions to return (default: 50, max: 100).
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Transaction response.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction id.
    pub id: String,
    /// Magnitude of the change. Always positive.
    pub amount: i64,
    /// "earned" or "spent".
    pub transaction_type: String,
    /// The activity that produced the change.
    pub source: String,
    /// Audit note.
    pub description: String,
    /// Balance after this transaction.
    pub balance_after: i64,
    /// Timestamp (RFC 3339).
    pub created_at: String,
}

impl From<&CoinTransaction> for TransactionResponse {
    fn from(tx: &CoinTransaction) -> Self {
        Self {
            id: tx.id.to_string(),
            amount: tx.amount,
            transaction_type: format!("{:?}", tx.transaction_type).to_lowercase(),
            source: tx.source.to_string(),
            description: tx.description.clone(),
            balance_after: tx.balance_after,
            created_at: tx.created_at.to_rfc3339(),
        }
    }
}

/// List transactions response.
#[derive(Debug, Serialize)]
pub struct ListTransactionsResponse {
    /// Transactions, newest first.
    pub transactions: Vec<TransactionResponse>,
}

/// List a user's recent transactions, newest first.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(user_id): Path<UserId>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<ListTransactionsResponse>, ApiError> {
    let limit = query.limit.min(100);
    let transactions = state.ledger.get_recent_transactions(user_id, limit)?;

    Ok(Json(ListTransactionsResponse {
        transactions: transactions.iter().map(TransactionResponse::from).collect(),
    }))
}
