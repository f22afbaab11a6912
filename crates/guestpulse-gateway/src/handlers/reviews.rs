// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Review submission, listing and CSV export.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use guestpulse_analytics::{export_filename, reviews_to_csv, ReviewFilter};
use guestpulse_core::{NewReview, PageRequest, Pagination, Review};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::handlers::new_id;
use crate::server::{AppState, GatewaySettings};

/// POST /api/reviews
pub async fn create_review(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewReview>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    let review = body.into_review(new_id(), state.clock.now())?;
    state
        .storage
        .insert_review(&review)
        .await
        .map_err(|e| ApiError::from(e).server_message("Failed to create review"))?;
    info!(
        id = %review.id,
        overall = review.overall_rating,
        services = review.services.len(),
        "review stored"
    );
    Ok((StatusCode::CREATED, Json(review)))
}

/// Paging parameters. Unparseable values fall back to the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

impl ListQuery {
    pub fn to_request(&self, settings: &GatewaySettings) -> PageRequest {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<u32>().ok());
        let page = parse(&self.page).filter(|p| *p >= 1).unwrap_or(1);
        let limit = parse(&self.limit)
            .filter(|l| *l >= 1)
            .unwrap_or(settings.default_page_size)
            .min(settings.max_page_size);
        PageRequest { page, limit }
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewPage {
    pub data: Vec<Review>,
    pub pagination: Pagination,
}

/// GET /api/reviews
pub async fn list_reviews(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Json<ReviewPage>> {
    let request = query.to_request(&state.settings);
    let page = state
        .storage
        .list_reviews(request)
        .await
        .map_err(|e| ApiError::from(e).server_message("Failed to fetch reviews"))?;
    Ok(Json(ReviewPage {
        pagination: Pagination::new(request, page.total),
        data: page.items,
    }))
}

/// GET /api/reviews/export
pub async fn export_reviews(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ReviewFilter>,
) -> ApiResult<impl IntoResponse> {
    filter.validate()?;
    let now = state.clock.now();
    let reviews = filter.apply(state.storage.all_reviews().await?, now);
    let csv = reviews_to_csv(&reviews)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_filename(now.date_naive())
    );
    info!(rows = reviews.len(), "review export generated");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use guestpulse_config::GuestPulseConfig;

    fn settings() -> GatewaySettings {
        GatewaySettings::from_config(&GuestPulseConfig::default())
    }

    #[test]
    fn paging_defaults_and_clamps() {
        let defaults = ListQuery::default().to_request(&settings());
        assert_eq!(defaults, PageRequest { page: 1, limit: 10 });

        let huge = ListQuery {
            page: Some("3".into()),
            limit: Some("5000".into()),
        }
        .to_request(&settings());
        assert_eq!(huge, PageRequest { page: 3, limit: 100 });

        let junk = ListQuery {
            page: Some("zero".into()),
            limit: Some("0".into()),
        }
        .to_request(&settings());
        assert_eq!(junk, PageRequest { page: 1, limit: 10 });
    }
}
