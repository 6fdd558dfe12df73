//! Coin change, summary, and transaction history integration tests.

mod common;

use common::TestHarness;
use serde_json::json;

use rewards_core::UserId;

// ============================================================================
// Coin changes
// ============================================================================

#[tokio::test]
async fn earn_returns_authoritative_balance() {
    let harness = TestHarness::new();
    let user_id = harness.register_user().await;

    let response = harness
        .server
        .post("/v1/coins/change")
        .add_header("authorization", harness.auth_header())
        .json(&json!({
            "user_id": user_id.to_string(),
            "amount": 75,
            "source": "mining",
            "description": "Daily mining session"
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["new_balance"], 75);
    assert_eq!(body["referral_bonus"]["status"], "not_applicable");
}

#[tokio::test]
async fn zero_amount_is_bad_request() {
    let harness = TestHarness::new();
    let user_id = harness.register_user().await;

    let response = harness
        .server
        .post("/v1/coins/change")
        .add_header("authorization", harness.auth_header())
        .json(&json!({
            "user_id": user_id.to_string(),
            "amount": 0,
            "source": "task"
        }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn overspend_is_payment_required() {
    let harness = TestHarness::new();
    let user_id = harness.register_user().await;
    harness.apply_change(user_id, 50, "task").await;

    let response = harness
        .server
        .post("/v1/coins/change")
        .add_header("authorization", harness.auth_header())
        .json(&json!({
            "user_id": user_id.to_string(),
            "amount": -80,
            "source": "redemption",
            "description": "Gift card"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::PAYMENT_REQUIRED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "insufficient_balance");
    assert_eq!(body["error"]["details"]["balance"], 50);
    assert_eq!(body["error"]["details"]["required"], 80);
}

#[tokio::test]
async fn exceeding_the_monthly_cap_is_unprocessable() {
    let harness = TestHarness::new();
    let user_id = harness.register_user().await;
    harness.apply_change(user_id, 950, "task").await;

    let response = harness
        .server
        .post("/v1/coins/change")
        .add_header("authorization", harness.auth_header())
        .json(&json!({
            "user_id": user_id.to_string(),
            "amount": 100,
            "source": "quiz",
            "description": "Quiz reward"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "monthly_limit_exceeded");
    assert_eq!(body["error"]["details"]["earned"], 950);
    assert_eq!(body["error"]["details"]["limit"], 1000);
}

#[tokio::test]
async fn referral_bonus_is_reported_in_the_response() {
    let harness = TestHarness::new();
    let referrer = harness.register_user().await;

    let referee = UserId::generate();
    harness
        .server
        .post("/v1/wallets")
        .add_header("authorization", harness.auth_header())
        .json(&json!({
            "user_id": referee.to_string(),
            "referred_by": referrer.to_string()
        }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let response = harness
        .server
        .post("/v1/coins/change")
        .add_header("authorization", harness.auth_header())
        .json(&json!({
            "user_id": referee.to_string(),
            "amount": 60,
            "source": "mining",
            "description": "First mining session"
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["referral_bonus"]["status"], "credited");
    assert_eq!(body["referral_bonus"]["referrer"], referrer.to_string());

    // The referrer's wallet reflects the bonus.
    let wallet = harness
        .server
        .get(&format!("/v1/wallets/{referrer}"))
        .add_header("authorization", harness.auth_header())
        .await;
    let wallet_body: serde_json::Value = wallet.json();
    assert_eq!(wallet_body["balance"], 100);
}

#[tokio::test]
async fn unknown_source_is_accepted() {
    let harness = TestHarness::new();
    let user_id = harness.register_user().await;

    let response = harness
        .server
        .post("/v1/coins/change")
        .add_header("authorization", harness.auth_header())
        .json(&json!({
            "user_id": user_id.to_string(),
            "amount": 10,
            "source": "treasure_hunt",
            "description": "New activity"
        }))
        .await;

    response.assert_status_ok();
}

// ============================================================================
// Monthly summary
// ============================================================================

#[tokio::test]
async fn summary_reflects_the_log() {
    let harness = TestHarness::new();
    let user_id = harness.register_user().await;
    harness.apply_change(user_id, 300, "mining").await;
    harness.apply_change(user_id, 200, "quiz").await;
    harness.apply_change(user_id, -100, "redemption").await;

    let response = harness
        .server
        .get(&format!("/v1/coins/{user_id}/summary"))
        .add_header("authorization", harness.auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["earned_this_month"], 500);
    assert_eq!(body["limit"], 1000);
    assert_eq!(body["remaining"], 500);
}

// ============================================================================
// Transactions
// ============================================================================

#[tokio::test]
async fn transactions_are_newest_first() {
    let harness = TestHarness::new();
    let user_id = harness.register_user().await;
    harness.apply_change(user_id, 10, "mining").await;
    // ULIDs are millisecond-resolution; keep the two timestamps distinct
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    harness.apply_change(user_id, 20, "quiz").await;

    let response = harness
        .server
        .get(&format!("/v1/coins/{user_id}/transactions?limit=10"))
        .add_header("authorization", harness.auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let transactions = body["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0]["amount"], 20);
    assert_eq!(transactions[0]["transaction_type"], "earned");
    assert_eq!(transactions[1]["amount"], 10);
}

#[tokio::test]
async fn transactions_for_unknown_user_are_not_found() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get(&format!(
            "/v1/coins/{}/transactions",
            UserId::generate()
        ))
        .add_header("authorization", harness.auth_header())
        .await;

    response.assert_status_not_found();
}
