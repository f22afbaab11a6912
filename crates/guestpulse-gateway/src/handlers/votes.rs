// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Guest votes cast through a session link.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use guestpulse_analytics::VoteSummary;
use guestpulse_core::{GuestPulseError, NewVote, Vote, VotingSession};
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::handlers::links::load_by_slug;
use crate::handlers::new_id;
use crate::server::AppState;

/// POST /api/votes/{slug}
pub async fn cast_vote(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ApiJson(body): ApiJson<NewVote>,
) -> ApiResult<(StatusCode, Json<Vote>)> {
    let (session, verdict) = load_by_slug(&state, &slug).await?;
    verdict.into_result()?;
    let session = session
        .ok_or_else(|| GuestPulseError::NotFound("Voting session not found".to_string()))?;

    let vote = body.into_vote(new_id(), session.id.clone(), state.clock.now())?;
    state
        .storage
        .insert_vote(&vote)
        .await
        .map_err(|e| ApiError::from(e).server_message("Failed to submit vote"))?;
    info!(session = %session.id, vote = %vote.id, "vote recorded");
    Ok((StatusCode::CREATED, Json(vote)))
}

#[derive(Debug, Serialize)]
pub struct SessionVotes {
    pub session: VotingSession,
    pub votes: Vec<Vote>,
    pub summary: VoteSummary,
}

/// GET /api/voting-sessions/{id}/votes
pub async fn list_votes(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionVotes>> {
    let session = state
        .storage
        .get_voting_session(&id)
        .await?
        .ok_or_else(|| GuestPulseError::NotFound("Voting session not found".to_string()))?;
    let votes = state.storage.list_votes(&id).await?;
    let summary = VoteSummary::from_votes(&votes);
    Ok(Json(SessionVotes {
        session,
        votes,
        summary,
    }))
}
