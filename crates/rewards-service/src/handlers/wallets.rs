//! Wallet registration and snapshot handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use rewards_core::{UserId, Wallet};

use crate::auth::ServiceAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Register request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// The user to register.
    pub user_id: UserId,
    /// The referring user, if the signup carried a referral code.
    #[serde(default)]
    pub referred_by: Option<UserId>,
}

/// Wallet snapshot response.
#[derive(Debug, Serialize)]
pub struct WalletResponse {
    /// The owning user.
    pub user_id: String,
    /// Current coin balance.
    pub balance: i64,
    /// Lifetime coins earned.
    pub lifetime_earned: i64,
    /// Lifetime coins spent.
    pub lifetime_spent: i64,
    /// Last mutation timestamp (RFC 3339).
    pub updated_at: String,
}

impl From<&Wallet> for WalletResponse {
    fn from(wallet: &Wallet) -> Self {
        Self {
            user_id: wallet.user_id.to_string(),
            balance: wallet.balance,
            lifetime_earned: wallet.lifetime_earned,
            lifetime_spent: wallet.lifetime_spent,
            updated_at: wallet.updated_at.to_rfc3339(),
        }
    }
}

/// Register a user: create a zero-balance wallet and referral profile.
pub async fn register(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<WalletResponse>), ApiError> {
    let wallet = state.ledger.register_user(body.user_id, body.referred_by)?;

    Ok((StatusCode::CREATED, Json(WalletResponse::from(&wallet))))
}

/// Get a wallet snapshot.
pub async fn get_wallet(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Path(user_id): Path<UserId>,
) -> Result<Json<WalletResponse>, ApiError> {
    let wallet = state.ledger.get_wallet(user_id)?;

    Ok(Json(WalletResponse::from(&wallet)))
}
