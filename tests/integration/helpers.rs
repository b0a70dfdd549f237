//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;

use studio_api::{AppState, build_app};
use studio_auth::PasswordHasher;
use studio_core::config::AppConfig;
use studio_core::traits::{Clock, FixedClock};
use studio_core::types::UserId;
use studio_database::{MemoryStore, Stores};
use studio_entity::user::{CreateUser, UserRole};
use studio_service::{Notifier, RecordingNotifier};

/// Password every helper-created account logs in with.
pub const PASSWORD: &str = "Pilates2025";

/// Monday 2025-03-03, noon studio time (UTC-3).
pub fn monday_noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 3, 15, 0, 0).unwrap()
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Application state, for direct service access
    pub state: AppState,
    /// Stores behind the state
    pub stores: Stores,
    /// Clock every service reads
    pub clock: Arc<FixedClock>,
    /// Captures outgoing notifications
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    /// Create a new test application on the in-memory store, pinned to
    /// [`monday_noon`].
    pub fn new() -> Self {
        Self::at(monday_noon())
    }

    pub fn at(now: DateTime<Utc>) -> Self {
        Self::with_config(now, AppConfig::default())
    }

    /// Slot capacity lowered to `capacity`, everything else default.
    pub fn with_capacity(capacity: u32) -> Self {
        let mut config = AppConfig::default();
        config.booking.slot_capacity = capacity;
        Self::with_config(monday_noon(), config)
    }

    pub fn with_config(now: DateTime<Utc>, mut config: AppConfig) -> Self {
        config.auth.jwt_secret = "integration-test-secret".to_string();

        let stores = Stores::from_memory(Arc::new(MemoryStore::new()));
        let clock = Arc::new(FixedClock::new(now));
        let notifier = Arc::new(RecordingNotifier::new());
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let dyn_notifier: Arc<dyn Notifier> = notifier.clone();

        let state = AppState::build(config, stores.clone(), None, dyn_clock, dyn_notifier)
            .expect("Failed to build app state");
        let router = build_app(state.clone());

        Self {
            router,
            state,
            stores,
            clock,
            notifier,
        }
    }

    /// Insert an account directly and return its ID
    pub async fn create_test_user(
        &self,
        email: &str,
        role: UserRole,
        weekly_quota: i16,
        paid: bool,
    ) -> UserId {
        let hash = PasswordHasher::new()
            .hash_password(PASSWORD)
            .expect("Failed to hash password");
        let now = self.clock.now();
        let user = self
            .stores
            .users
            .create(
                CreateUser {
                    name: email.split('@').next().unwrap_or("member").to_string(),
                    surname: "Tester".to_string(),
                    email: email.to_string(),
                    phone: "1155551234".to_string(),
                    weekly_quota,
                    password_hash: hash,
                    role,
                },
                now,
            )
            .await
            .expect("Failed to create test user");

        if paid {
            self.stores
                .users
                .set_paid(user.id, true, now)
                .await
                .expect("Failed to mark user as paid");
        }
        user.id
    }

    /// Create a member and return `(id, access token)`
    pub async fn member(&self, email: &str, weekly_quota: i16, paid: bool) -> (UserId, String) {
        let id = self
            .create_test_user(email, UserRole::User, weekly_quota, paid)
            .await;
        (id, self.login(email, PASSWORD).await)
    }

    /// Create an administrator and return `(id, access token)`
    pub async fn admin(&self) -> (UserId, String) {
        let email = "admin@studio.test";
        let id = self.create_test_user(email, UserRole::Admin, 1, true).await;
        (id, self.login(email, PASSWORD).await)
    }

    /// Login and return JWT access token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let body = json!({
            "email": email,
            "password": password,
        });

        let response = self
            .request("POST", "/api/auth/login", Some(body), None)
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        response.body["data"]["access_token"]
            .as_str()
            .expect("No access_token in login response")
            .to_string()
    }

    /// Give a member their permanent schedule through the API
    pub async fn assign(&self, token: &str, slots: Value) {
        let response = self
            .request(
                "PUT",
                "/api/schedule/me",
                Some(json!({ "slots": slots })),
                Some(token),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Assignment failed: {:?}",
            response.body
        );
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// `{"day": .., "hour": ..}` as the API expects it.
pub fn slot(day: &str, hour: &str) -> Value {
    json!({ "day": day, "hour": hour })
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// Machine-readable reason attached to a rejection, if any.
    pub fn reason(&self) -> Option<&str> {
        self.body["details"]["reason"].as_str()
    }
}
