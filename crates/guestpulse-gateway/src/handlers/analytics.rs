// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dashboard analytics over stored reviews.

use axum::{extract::State, Json};
use guestpulse_analytics::{DashboardReport, ReviewFilter};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiQuery;
use crate::server::AppState;

/// GET /api/analytics
pub async fn get_analytics(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ReviewFilter>,
) -> ApiResult<Json<DashboardReport>> {
    filter.validate()?;
    let reviews = state
        .storage
        .all_reviews()
        .await
        .map_err(|e| ApiError::from(e).server_message("Failed to fetch reviews"))?;
    let reviews = filter.apply(reviews, state.clock.now());
    debug!(reviews = reviews.len(), period = %filter.period, "building dashboard report");
    Ok(Json(DashboardReport::build(&reviews)))
}
