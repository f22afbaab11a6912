// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit log, notifications and the guest submission throttle.

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use guestpulse_journal::{
    AuditEntry, NewNotification, Notification, NotificationPatch, SubmissionStatus,
};
use serde::{Deserialize, Serialize};

use crate::auth::Operator;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ClientIp};
use crate::server::AppState;

/// GET /api/audit-logs
pub async fn list_audit_logs(State(state): State<AppState>) -> ApiResult<Json<Vec<AuditEntry>>> {
    let entries = state
        .journal
        .audit_entries()
        .await
        .map_err(|e| ApiError::from(e).server_message("Failed to read audit logs"))?;
    Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
pub struct NewAuditEntry {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

/// POST /api/audit-logs
///
/// The entry is attributed to the authenticated operator.
pub async fn create_audit_log(
    State(state): State<AppState>,
    Extension(operator): Extension<Operator>,
    ApiJson(body): ApiJson<NewAuditEntry>,
) -> ApiResult<Json<AuditEntry>> {
    let entry = state
        .journal
        .record(
            body.action.unwrap_or_default(),
            &operator.username,
            body.details.unwrap_or_default(),
            state.clock.now(),
        )
        .await
        .map_err(|e| ApiError::from(e).server_message("Failed to write audit log"))?;
    Ok(Json(entry))
}

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Notification>>> {
    Ok(Json(state.journal.notifications().await?))
}

/// POST /api/notifications
pub async fn create_notification(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewNotification>,
) -> ApiResult<Json<Notification>> {
    Ok(Json(state.journal.notify(body, state.clock.now()).await?))
}

/// PATCH /api/notifications
pub async fn update_notification(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NotificationPatch>,
) -> ApiResult<Json<Notification>> {
    Ok(Json(state.journal.update_notification(body).await?))
}

/// GET /api/user-submissions
pub async fn get_submission_status(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
) -> ApiResult<Json<SubmissionStatus>> {
    Ok(Json(
        state.journal.submission_status(&ip, state.clock.now()).await?,
    ))
}

#[derive(Debug, Serialize)]
pub struct SubmissionRecorded {
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

/// POST /api/user-submissions
pub async fn record_submission(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
) -> ApiResult<(StatusCode, Json<SubmissionRecorded>)> {
    let submission = state
        .journal
        .record_submission(&ip, state.clock.now())
        .await
        .map_err(|e| ApiError::from(e).server_message("Failed to record submission"))?;
    Ok((
        StatusCode::CREATED,
        Json(SubmissionRecorded {
            success: true,
            timestamp: submission.timestamp,
        }),
    ))
}
