//! Router configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{coins, health, wallets};
use crate::state::AppState;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Ledger (service API key auth)
/// - `POST /v1/wallets` - Register a user (wallet + referral profile)
/// - `GET /v1/wallets/{user_id}` - Wallet snapshot
/// - `POST /v1/coins/change` - Apply a coin change
/// - `GET /v1/coins/{user_id}/summary` - Monthly earning summary
/// - `GET /v1/coins/{user_id}/transactions` - Recent transactions
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.cors_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let state = Arc::new(state);

    Router::new()
        // Health (public)
        .route("/health", get(health::health))
        // Wallets
        .route("/v1/wallets", post(wallets::register))
        .route("/v1/wallets/:user_id", get(wallets::get_wallet))
        // Coins
        .route("/v1/coins/change", post(coins::apply_change))
        .route("/v1/coins/:user_id/summary", get(coins::monthly_summary))
        .route(
            "/v1/coins/:user_id/transactions",
            get(coins::list_transactions),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
