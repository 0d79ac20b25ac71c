//! Shared helpers for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use aurum::{
    api::routes,
    auth::{clock::ManualClock, password::Argon2Hasher},
    db::{TursoClient, UserStore},
    market::PriceSeries,
    types::{AppError, NewUser, Result, Role, User},
    AppState, AurumConfig, MarketData,
};
use axum_test::TestServer;
use cookie::Cookie;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

pub const TEST_SECRET: &str = "test_signing_key_for_integration_tests_only";
pub const STRONG_PASSWORD: &str = "Xk9#mQ2$vL7!pR4&";

/// A running app plus handles to its clock and store.
pub struct TestApp {
    pub server: TestServer,
    pub clock: Arc<ManualClock>,
    pub store: Arc<TursoClient>,
}

pub fn test_config() -> AurumConfig {
    let mut config = AurumConfig::default();
    // Cheap hashing keeps the suite fast.
    config.auth.hash_memory_kib = 1024;
    config.auth.hash_iterations = 1;
    config
}

pub fn test_market() -> MarketData {
    let gold: PriceSeries = [("2024-01-02", 2063.4_f32), ("2024-01-03", 2041.75)]
        .into_iter()
        .map(|(date, price)| (date.to_string(), price))
        .collect();
    let silver: PriceSeries = [("2024-01-02".to_string(), 23.71_f32)].into_iter().collect();

    MarketData::from_series(HashMap::from([
        ("gold".to_string(), gold),
        ("silver".to_string(), silver),
    ]))
}

pub fn build_server(store: Arc<dyn UserStore>, clock: Arc<ManualClock>) -> TestServer {
    let state = AppState::new(test_config(), TEST_SECRET, store, clock, test_market())
        .expect("Failed to build app state");

    TestServer::new(routes::app(state)).expect("Failed to create test server")
}

pub async fn spawn_app() -> TestApp {
    let store = Arc::new(
        TursoClient::new_memory()
            .await
            .expect("Failed to create in-memory database"),
    );
    let clock = Arc::new(ManualClock::starting_now());
    let server = build_server(store.clone(), clock.clone());

    TestApp {
        server,
        clock,
        store,
    }
}

impl TestApp {
    pub async fn register(&self, username: &str, email: &str) {
        self.server
            .post("/api/register")
            .json(&json!({
                "username": username,
                "email": email,
                "password": STRONG_PASSWORD,
                "password2": STRONG_PASSWORD,
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }

    /// Log in and return the session cookie.
    pub async fn login(&self, identifier: &str) -> Cookie<'static> {
        let response = self
            .server
            .post("/api/login")
            .json(&json!({
                "identifier": identifier,
                "password": STRONG_PASSWORD,
            }))
            .await;
        response.assert_status_ok();
        response.cookie("access_token")
    }

    /// Insert an admin directly; the API never grants the role.
    pub async fn create_admin(&self, username: &str) -> User {
        let hasher = Argon2Hasher::new(1024, 1).expect("valid params");
        self.store
            .save(NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password_hash: hasher.hash_password(STRONG_PASSWORD).expect("hash"),
                role: Role::Admin,
            })
            .await
            .expect("Failed to create admin")
    }

    pub async fn delete_user(&self, id: i64) {
        self.store
            .connection()
            .execute("DELETE FROM users WHERE id = ?", [id])
            .await
            .expect("Failed to delete user");
    }
}

/// A store whose every call fails, for exercising 500 responses.
pub struct FailingStore;

#[async_trait]
impl UserStore for FailingStore {
    async fn save(&self, _user: NewUser) -> Result<User> {
        Err(AppError::Database(
            "disk I/O error at /var/lib/aurum/aurum.db".to_string(),
        ))
    }

    async fn find_by_username_or_email(&self, _identifier: &str) -> Result<Option<User>> {
        Ok(None)
    }

    async fn find_by_id(&self, _id: i64) -> Result<Option<User>> {
        Err(AppError::Database("connection reset".to_string()))
    }
}
