// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Public voting-link endpoints used by the guest pages.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use guestpulse_core::{
    verify_link, GuestPulseError, LinkVerdict, SessionStatus, VotingSession,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::extract::ApiQuery;
use crate::handlers::sessions::settle_expiry;
use crate::qr;
use crate::server::AppState;

/// Fetch a session by slug with lazy expiry applied, and judge its link.
pub(crate) async fn load_by_slug(
    state: &AppState,
    slug: &str,
) -> Result<(Option<VotingSession>, LinkVerdict), GuestPulseError> {
    let session = match state.storage.get_voting_session_by_slug(slug).await? {
        Some(session) => Some(settle_expiry(state, session).await),
        None => None,
    };
    let verdict = verify_link(session.as_ref(), state.clock.now());
    Ok((session, verdict))
}

fn status_code(verdict: LinkVerdict) -> StatusCode {
    StatusCode::from_u16(verdict.http_status()).unwrap_or(StatusCode::FORBIDDEN)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSession {
    #[serde(flatten)]
    pub session: VotingSession,
    pub is_valid: bool,
}

/// Why a session page cannot be shown.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosedSession {
    pub error: &'static str,
    pub message: &'static str,
    pub session_title: Option<String>,
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl ClosedSession {
    fn new(verdict: LinkVerdict, session: Option<&VotingSession>) -> Self {
        // An active session whose window has not opened yet.
        let status = session.map(|s| {
            if verdict == LinkVerdict::NotStarted && s.status == SessionStatus::Active {
                "pending_start".to_string()
            } else {
                s.status.to_string()
            }
        });
        let end_time = match verdict {
            LinkVerdict::Completed | LinkVerdict::Expired => session.and_then(|s| s.end_time),
            _ => None,
        };
        Self {
            error: verdict.message(),
            message: verdict.message(),
            session_title: session.map(|s| s.title.clone()),
            status,
            end_time,
        }
    }
}

/// GET /api/voting-sessions/slug/{slug}
pub async fn get_session_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Response> {
    let (session, verdict) = load_by_slug(&state, &slug).await?;
    match session {
        Some(session) if verdict.is_open() => Ok(Json(OpenSession {
            session,
            is_valid: true,
        })
        .into_response()),
        session => Ok((
            status_code(verdict),
            Json(ClosedSession::new(verdict, session.as_ref())),
        )
            .into_response()),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkValid {
    pub is_valid: bool,
    pub title: String,
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct LinkRejected {
    pub error: &'static str,
    pub reason: &'static str,
}

/// GET /api/verify-vote-link/{slug}
pub async fn verify_vote_link(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Response> {
    let (session, verdict) = load_by_slug(&state, &slug).await?;
    match session {
        Some(session) if verdict.is_open() => Ok(Json(LinkValid {
            is_valid: true,
            title: session.title,
            id: session.id,
        })
        .into_response()),
        _ => Ok((
            status_code(verdict),
            Json(LinkRejected {
                error: verdict.message(),
                reason: verdict.reason(),
            }),
        )
            .into_response()),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct QrQuery {
    #[serde(default)]
    pub format: Option<String>,
}

/// GET /api/voting-sessions/slug/{slug}/qr?format=svg
pub async fn get_session_qr(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ApiQuery(query): ApiQuery<QrQuery>,
) -> ApiResult<Response> {
    let format = query.format.as_deref().unwrap_or("svg");
    if format != "svg" {
        return Err(
            GuestPulseError::Validation(format!("Unsupported QR format: {format}")).into(),
        );
    }
    let session = state
        .storage
        .get_voting_session_by_slug(&slug)
        .await?
        .ok_or_else(|| GuestPulseError::NotFound("Voting session not found".to_string()))?;
    let svg = qr::render_svg(&state.settings.voting_url(&session.unique_link_slug))?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use guestpulse_core::{DurationLimits, NewSession};

    fn session(auto_start: bool) -> VotingSession {
        VotingSession::create(
            NewSession {
                title: Some("Dinner".into()),
                duration: Some(30),
                auto_start: Some(auto_start),
                ..NewSession::default()
            },
            &DurationLimits::default(),
            "s-1".into(),
            "slug".into(),
            "creator".into(),
            Utc.with_ymd_and_hms(2026, 6, 1, 18, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn closed_body_for_draft_reports_status() {
        let draft = session(false);
        let body = ClosedSession::new(LinkVerdict::NotStarted, Some(&draft));
        assert_eq!(body.status.as_deref(), Some("draft"));
        assert_eq!(body.session_title.as_deref(), Some("Dinner"));
        assert!(body.end_time.is_none());
    }

    #[test]
    fn closed_body_for_future_start_is_pending() {
        let mut active = session(true);
        active.start_time = Some(active.created_at + chrono::Duration::hours(1));
        let body = ClosedSession::new(LinkVerdict::NotStarted, Some(&active));
        assert_eq!(body.status.as_deref(), Some("pending_start"));
    }

    #[test]
    fn closed_body_for_missing_session() {
        let body = ClosedSession::new(LinkVerdict::NotFound, None);
        assert_eq!(body.error, "Voting session not found");
        assert!(body.status.is_none());
        assert_eq!(status_code(LinkVerdict::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_code(LinkVerdict::Expired), StatusCode::GONE);
    }
}
