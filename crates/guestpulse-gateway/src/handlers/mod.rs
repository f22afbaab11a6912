// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

pub mod analytics;
pub mod auth;
pub mod journal;
pub mod links;
pub mod reviews;
pub mod sessions;
pub mod users;
pub mod votes;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use guestpulse_core::{HealthStatus, PluginAdapter};
use serde::Serialize;

use crate::server::AppState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub storage: String,
    pub journal: String,
}

fn describe(result: Result<HealthStatus, guestpulse_core::GuestPulseError>) -> (bool, String) {
    match result {
        Ok(HealthStatus::Healthy) => (true, "healthy".to_string()),
        Ok(HealthStatus::Degraded(reason)) => (true, format!("degraded: {reason}")),
        Ok(HealthStatus::Unhealthy(reason)) => (false, format!("unhealthy: {reason}")),
        Err(e) => (false, format!("unhealthy: {e}")),
    }
}

/// GET /health
pub async fn get_health(State(state): State<AppState>) -> impl IntoResponse {
    let (storage_ok, storage) = describe(state.storage.health_check().await);
    let (journal_ok, journal) = describe(state.journal.health_check().await);
    let healthy = storage_ok && journal_ok;

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "unavailable" },
            version: env!("CARGO_PKG_VERSION"),
            storage,
            journal,
        }),
    )
}

/// Fresh random identifier for a new row.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// `{"success": true}`
#[derive(Debug, Serialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}
