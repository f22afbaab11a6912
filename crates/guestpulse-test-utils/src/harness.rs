// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end API testing.
//!
//! `TestHarness` assembles the full gateway stack over a temp SQLite database
//! and a temp journal directory, with a manual clock so voting windows can be
//! crossed without sleeping.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;

use guestpulse_config::model::{GuestPulseConfig, StorageConfig};
use guestpulse_core::types::SEED_PASSWORD;
use guestpulse_core::{Clock, GuestPulseError, ManualClock, Role, StorageAdapter, User};
use guestpulse_gateway::{build_router, AppState, GatewaySettings};
use guestpulse_journal::Journal;
use guestpulse_storage::SqliteStorage;
use guestpulse_vault::{hash_password, CookieSigner, PasswordParams};

const TEST_COOKIE_SECRET: &[u8] = b"guestpulse-test-cookie-secret-0123456789";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    start: DateTime<Utc>,
    config: GuestPulseConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            start: Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).single().unwrap_or_else(Utc::now),
            config: GuestPulseConfig::default(),
        }
    }

    /// Initial time of the manual clock.
    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    /// Adjust the configuration before the stack is built.
    pub fn with_config(mut self, edit: impl FnOnce(&mut GuestPulseConfig)) -> Self {
        edit(&mut self.config);
        self
    }

    /// Build the harness: storage, seeded accounts, journal and router.
    pub async fn build(self) -> Result<TestHarness, GuestPulseError> {
        let temp_dir = tempfile::TempDir::new().map_err(GuestPulseError::storage)?;
        let mut config = self.config;
        config.storage = StorageConfig {
            database_path: temp_dir.path().join("test.db").to_string_lossy().to_string(),
            wal_mode: true,
        };
        config.journal.data_dir = temp_dir.path().join("data").to_string_lossy().to_string();

        let params = PasswordParams::insecure_fast();
        let clock = Arc::new(ManualClock::new(self.start));

        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        let seed_hash = hash_password(SEED_PASSWORD, &params)?;
        storage
            .seed_default_users(seed_hash.clone(), seed_hash, clock.now())
            .await?;
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let journal = Arc::new(Journal::from_config(&config.journal, &config.feedback));

        let mut settings = GatewaySettings::from_config(&config);
        settings.password_params = params;

        let state = AppState {
            storage: Arc::clone(&storage),
            journal: Arc::clone(&journal),
            signer: CookieSigner::new(TEST_COOKIE_SECRET),
            clock: clock.clone(),
            settings: Arc::new(settings),
        };

        Ok(TestHarness {
            storage,
            journal,
            clock,
            state,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A response with its body collected.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// Body parsed as JSON (`Null` if it is not JSON).
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Raw `Set-Cookie` header values.
    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }

    /// A `Cookie` request header carrying every non-empty cookie that was set.
    pub fn cookie_header(&self) -> String {
        self.set_cookies()
            .iter()
            .filter_map(|c| c.split(';').next())
            .filter(|pair| pair.split_once('=').is_some_and(|(_, v)| !v.is_empty()))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A complete gateway test environment.
pub struct TestHarness {
    /// SQLite storage (temp DB, removed on drop).
    pub storage: Arc<dyn StorageAdapter>,
    /// JSON journal in the temp directory.
    pub journal: Arc<Journal>,
    /// The clock every handler reads.
    pub clock: Arc<ManualClock>,
    /// Shared handler state.
    pub state: AppState,
    /// Effective configuration.
    pub config: GuestPulseConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    /// Send one request through a fresh router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router()
            .oneshot(request)
            .await
            .unwrap_or_else(|never| match never {});
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Send a request with an optional JSON body and `Cookie` header.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        cookies: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookies) = cookies {
            builder = builder.header(header::COOKIE, cookies);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        match builder.body(body) {
            Ok(request) => self.send(request).await,
            Err(e) => panic!("invalid test request {uri}: {e}"),
        }
    }

    pub async fn get(&self, uri: &str, cookies: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, None, cookies).await
    }

    pub async fn post(&self, uri: &str, body: Value, cookies: Option<&str>) -> TestResponse {
        self.request(Method::POST, uri, Some(body), cookies).await
    }

    /// Log in and return the `Cookie` header for later requests.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post(
                "/api/auth",
                serde_json::json!({ "username": username, "password": password }),
                None,
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "login as {username} failed: {}",
            response.text()
        );
        response.cookie_header()
    }

    pub async fn login_admin(&self) -> String {
        self.login("admin", SEED_PASSWORD).await
    }

    pub async fn login_superadmin(&self) -> String {
        self.login("superadmin", SEED_PASSWORD).await
    }

    /// Insert an operator directly into storage.
    pub async fn add_user(&self, username: &str, password: &str, role: Role, active: bool) -> User {
        let user = User {
            id: format!("user-{username}"),
            username: username.to_string(),
            password_hash: hash_password(password, &PasswordParams::insecure_fast())
                .unwrap_or_else(|e| panic!("hashing failed: {e}")),
            role,
            is_active: active,
            created_at: self.now(),
            created_by: Some("test".to_string()),
            last_login: None,
            updated_at: None,
            updated_by: None,
        };
        self.storage
            .create_user(&user)
            .await
            .unwrap_or_else(|e| panic!("failed to add user {username}: {e}"));
        user
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_seeds_both_accounts() {
        let harness = TestHarness::builder().build().await.unwrap();
        let users = harness.storage.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert!(harness.journal.dir().starts_with(harness._temp_dir.path()));
    }

    #[tokio::test]
    async fn clock_is_manual() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let harness = TestHarness::builder().with_start(start).build().await.unwrap();
        harness.advance(Duration::minutes(31));
        assert_eq!(harness.now(), start + Duration::minutes(31));
    }

    #[test]
    fn cookie_header_skips_cleared_cookies() {
        let mut headers = HeaderMap::new();
        headers.append(header::SET_COOKIE, "adminToken=abc; Path=/; HttpOnly".parse().unwrap());
        headers.append(header::SET_COOKIE, "adminAuth=; Path=/; Max-Age=0".parse().unwrap());
        let response = TestResponse {
            status: StatusCode::OK,
            headers,
            body: Bytes::new(),
        };
        assert_eq!(response.cookie_header(), "adminToken=abc");
    }
}
