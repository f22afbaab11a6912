// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Voting session management.
//!
//! Reads apply lazy expiry: an `active` session whose window has closed is
//! rewritten to `expired` the first time it is observed.

use axum::{extract::State, Extension, Json};
use guestpulse_core::{
    GuestPulseError, NewSession, SessionAction, SessionPatch, SessionStatus, SessionUpdate,
    VotingSession,
};
use guestpulse_journal::AuditAction;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::Operator;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::handlers::{new_id, Success};
use crate::server::AppState;

fn not_found() -> GuestPulseError {
    GuestPulseError::NotFound("Voting session not found".to_string())
}

/// Append an audit entry, logging instead of failing the request.
pub(crate) async fn audit(state: &AppState, action: AuditAction, user: &str, details: String) {
    if let Err(e) = state
        .journal
        .record(action, user, details, state.clock.now())
        .await
    {
        warn!(action = %action, error = %e, "failed to record audit entry");
    }
}

/// Persist `expired` for an overdue session and return the corrected row.
///
/// The write only lands if the stored row is still active and overdue. When
/// it was paused, stopped or extended after `session` was read, the current
/// row is returned instead and nothing is audited. A failed write is logged
/// and the in-memory correction is still returned.
pub(crate) async fn settle_expiry(state: &AppState, session: VotingSession) -> VotingSession {
    let now = state.clock.now();
    if !session.is_overdue(now) {
        return session;
    }
    let expired = match state.storage.expire_voting_session(&session.id, now).await {
        Ok(Some(updated)) => updated,
        Ok(None) => {
            return match state.storage.get_voting_session(&session.id).await {
                Ok(Some(current)) => current,
                Ok(None) => session,
                Err(e) => {
                    warn!(id = %session.id, error = %e, "failed to reload voting session");
                    session
                }
            };
        }
        Err(e) => {
            warn!(id = %session.id, error = %e, "failed to persist session expiry");
            let mut session = session;
            session.apply(&SessionPatch::status(SessionStatus::Expired), now);
            session
        }
    };
    info!(id = %expired.id, title = %expired.title, "voting session expired");
    audit(
        state,
        AuditAction::SessionExpired,
        "system",
        format!("Voting session \"{}\" expired", expired.title),
    )
    .await;
    expired
}

/// A session plus its public links.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionWithLinks {
    #[serde(flatten)]
    pub session: VotingSession,
    pub voting_url: String,
    pub qr_code_url: String,
}

/// GET /api/voting-sessions
pub async fn list_sessions(State(state): State<AppState>) -> ApiResult<Json<Vec<VotingSession>>> {
    let sessions = state
        .storage
        .list_voting_sessions()
        .await
        .map_err(|e| ApiError::from(e).server_message("Failed to fetch voting sessions"))?;
    let mut settled = Vec::with_capacity(sessions.len());
    for session in sessions {
        settled.push(settle_expiry(&state, session).await);
    }
    Ok(Json(settled))
}

/// POST /api/voting-sessions
pub async fn create_session(
    State(state): State<AppState>,
    Extension(operator): Extension<Operator>,
    ApiJson(body): ApiJson<NewSession>,
) -> ApiResult<Json<SessionWithLinks>> {
    let session = VotingSession::create(
        body,
        &state.settings.session_limits,
        new_id(),
        new_id(),
        operator.id.clone(),
        state.clock.now(),
    )?;
    state
        .storage
        .create_voting_session(&session)
        .await
        .map_err(|e| ApiError::from(e).server_message("Failed to create voting session"))?;
    info!(id = %session.id, status = %session.status, "voting session created");
    audit(
        &state,
        AuditAction::VotingSessionCreated,
        &operator.username,
        format!("Created voting session \"{}\"", session.title),
    )
    .await;

    let slug = session.unique_link_slug.clone();
    Ok(Json(SessionWithLinks {
        voting_url: state.settings.voting_url(&slug),
        qr_code_url: state.settings.qr_code_url(&slug),
        session,
    }))
}

fn audit_action_for(update: &SessionUpdate) -> AuditAction {
    match update.action {
        Some(SessionAction::Start) => AuditAction::SessionStarted,
        Some(SessionAction::Pause) => AuditAction::SessionPaused,
        Some(SessionAction::Resume) => AuditAction::SessionResumed,
        Some(SessionAction::Stop) => AuditAction::SessionStopped,
        None => AuditAction::VotingSessionUpdated,
    }
}

/// PATCH /api/voting-sessions
pub async fn update_session(
    State(state): State<AppState>,
    Extension(operator): Extension<Operator>,
    ApiJson(body): ApiJson<SessionUpdate>,
) -> ApiResult<Json<VotingSession>> {
    let Some(id) = body.id.clone().filter(|id| !id.is_empty()) else {
        return Err(GuestPulseError::Validation("Session ID is required".to_string()).into());
    };
    let current = state
        .storage
        .get_voting_session(&id)
        .await?
        .ok_or_else(not_found)?;
    let current = settle_expiry(&state, current).await;

    let now = state.clock.now();
    let patch = current.plan_update(&body, &state.settings.session_limits, now)?;
    if patch.is_empty() {
        return Ok(Json(current));
    }
    let updated = state
        .storage
        .update_voting_session(&id, &patch, now)
        .await
        .map_err(|e| ApiError::from(e).server_message("Failed to update voting session"))?
        .ok_or_else(not_found)?;

    let action = audit_action_for(&body);
    info!(id = %updated.id, action = %action, status = %updated.status, "voting session updated");
    audit(
        &state,
        action,
        &operator.username,
        format!("Updated voting session \"{}\"", updated.title),
    )
    .await;
    Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    #[serde(default)]
    pub id: Option<String>,
}

/// DELETE /api/voting-sessions?id=
pub async fn delete_session(
    State(state): State<AppState>,
    Extension(operator): Extension<Operator>,
    ApiQuery(query): ApiQuery<IdQuery>,
) -> ApiResult<Json<Success>> {
    let Some(id) = query.id.filter(|id| !id.is_empty()) else {
        return Err(GuestPulseError::Validation("Session ID is required".to_string()).into());
    };
    let session = state
        .storage
        .get_voting_session(&id)
        .await?
        .ok_or_else(not_found)?;
    if !state
        .storage
        .delete_voting_session(&id)
        .await
        .map_err(|e| ApiError::from(e).server_message("Failed to delete voting session"))?
    {
        return Err(not_found().into());
    }
    info!(id = %id, "voting session deleted");
    audit(
        &state,
        AuditAction::VotingSessionDeleted,
        &operator.username,
        format!("Deleted voting session \"{}\"", session.title),
    )
    .await;
    Ok(Success::ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_audit_action_follows_the_requested_transition() {
        let mut update = SessionUpdate::default();
        assert_eq!(audit_action_for(&update), AuditAction::VotingSessionUpdated);
        update.action = Some(SessionAction::Pause);
        assert_eq!(audit_action_for(&update), AuditAction::SessionPaused);
        update.action = Some(SessionAction::Stop);
        assert_eq!(audit_action_for(&update), AuditAction::SessionStopped);
    }
}
