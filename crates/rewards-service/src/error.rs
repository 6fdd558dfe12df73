//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use rewards_core::LedgerError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict - resource already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The earn would exceed the monthly cap.
    #[error("monthly limit exceeded: earned={earned}, attempted={attempted}, limit={limit}")]
    MonthlyLimitExceeded {
        /// Non-referral coins earned this month.
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
        /// Coins required.
        required: i64,
    },

    /// The store is unavailable; the request is safe to retry.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone(), None),
            Self::MonthlyLimitExceeded {
                earned,
                attempted,
                limit,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "monthly_limit_exceeded",
                self.to_string(),
                Some(serde_json::json!({
                    "earned": earned,
                    "attempted": attempted,
                    "limit": limit
                })),
            ),
            Self::InsufficientBalance { balance, required } => (
                StatusCode::PAYMENT_REQUIRED,
                "insufficient_balance",
                self.to_string(),
                Some(serde_json::json!({
                    "balance": balance,
                    "required": required
                })),
            ),
            Self::StoreUnavailable(msg) => {
                tracing::error!(error = %msg, "Store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "store_unavailable",
                    "Storage is temporarily unavailable".to_string(),
                    None,
                )
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::UserNotFound { user_id } => {
                Self::NotFound(format!("user not found: {user_id}"))
            }
            LedgerError::UserAlreadyExists { user_id } => {
                Self::Conflict(format!("user already registered: {user_id}"))
            }
            LedgerError::MonthlyLimitExceeded {
                earned,
                attempted,
                limit,
            } => Self::MonthlyLimitExceeded {
                earned,
                attempted,
                limit,
            },
            LedgerError::InsufficientBalance { balance, required } => {
                Self::InsufficientBalance { balance, required }
            }
            LedgerError::InvalidAmount(msg) | LedgerError::InvalidReferral(msg) => {
                Self::BadRequest(msg)
            }
            LedgerError::InvalidId(err) => Self::BadRequest(err.to_string()),
            LedgerError::StoreUnavailable(msg) => Self::StoreUnavailable(msg),
            LedgerError::ReferralCreditFailed { .. } => Self::Internal(err.to_string()),
        }
    }
}
