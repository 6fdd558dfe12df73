//! Common test utilities for rewards-service integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use axum::Router;
use axum_test::TestServer;
use serde_json::json;
use tempfile::TempDir;

use rewards_core::UserId;
use rewards_service::{create_router, AppState, ServiceConfig};
use rewards_store::RocksStore;

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// The service API key for authenticated requests.
    pub service_api_key: String,
}

impl TestHarness {
    /// Create a new test harness with a fresh database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = RocksStore::open(temp_dir.path()).expect("Failed to open store");

        let service_api_key = "test-service-key".to_string();

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            service_api_key: Some(service_api_key.clone()),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        };

        let state = AppState::new(store, config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            _temp_dir: temp_dir,
            service_api_key,
        }
    }

    /// The authorization header value for service requests.
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.service_api_key)
    }

    /// Register a fresh user and return its id.
    pub async fn register_user(&self) -> UserId {
        let user_id = UserId::generate();
        self.server
            .post("/v1/wallets")
            .add_header("authorization", self.auth_header())
            .json(&json!({ "user_id": user_id.to_string() }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
        user_id
    }

    /// Apply a coin change for a user, asserting success.
    pub async fn apply_change(&self, user_id: UserId, amount: i64, source: &str) {
        self.server
            .post("/v1/coins/change")
            .add_header("authorization", self.auth_header())
            .json(&json!({
                "user_id": user_id.to_string(),
                "amount": amount,
                "source": source,
                "description": "test change"
            }))
            .await
            .assert_status_ok();
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
