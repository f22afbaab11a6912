// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Guest review persistence. Reviews are immutable once inserted.

use guestpulse_core::{GuestPulseError, Page, PageRequest, Review};
use rusqlite::types::Type;
use rusqlite::{params, Row};

use crate::database::Database;
use crate::models::{decode_ts, encode_ts};

const REVIEW_COLUMNS: &str = "id, full_name, nationality, age, room_number, submitted_at, \
                              overall_rating, recommend, visit_again, services, suggestions, created_by";

fn review_from_row(row: &Row<'_>) -> Result<Review, rusqlite::Error> {
    let services: String = row.get(9)?;
    let services = serde_json::from_str(&services)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)))?;
    Ok(Review {
        id: row.get(0)?,
        full_name: row.get(1)?,
        nationality: row.get(2)?,
        age: row.get(3)?,
        room_number: row.get(4)?,
        submitted_at: decode_ts(5, row.get(5)?)?,
        overall_rating: row.get(6)?,
        recommend: row.get(7)?,
        visit_again: row.get(8)?,
        services,
        suggestions: row.get(10)?,
        created_by: row.get(11)?,
    })
}

/// Insert a validated review.
pub async fn insert_review(db: &Database, review: &Review) -> Result<(), GuestPulseError> {
    let services = serde_json::to_string(&review.services).map_err(GuestPulseError::storage)?;
    let review = review.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO reviews (id, full_name, nationality, age, room_number, submitted_at,
                                      overall_rating, recommend, visit_again, services,
                                      suggestions, created_by)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    review.id,
                    review.full_name,
                    review.nationality,
                    review.age,
                    review.room_number,
                    encode_ts(review.submitted_at),
                    review.overall_rating,
                    review.recommend,
                    review.visit_again,
                    services,
                    review.suggestions,
                    review.created_by,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// One page of reviews, newest first, with the overall count.
pub async fn list_reviews(db: &Database, page: PageRequest) -> Result<Page<Review>, GuestPulseError> {
    let limit = i64::from(page.limit);
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let total: i64 = conn.query_row("SELECT COUNT(*) FROM reviews", [], |r| r.get(0))?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {REVIEW_COLUMNS} FROM reviews
                 ORDER BY submitted_at DESC, id DESC LIMIT ?1 OFFSET ?2"
            ))?;
            let items = stmt
                .query_map(params![limit, offset], review_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Page {
                items,
                total: u64::try_from(total).unwrap_or_default(),
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Every review, oldest first. Feeds analytics and CSV export.
pub async fn all_reviews(db: &Database) -> Result<Vec<Review>, GuestPulseError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY submitted_at ASC, id ASC"
            ))?;
            let rows = stmt.query_map([], review_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
