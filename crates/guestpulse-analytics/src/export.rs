// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Detailed review spreadsheet.

use std::io::Write;

use chrono::NaiveDate;
use guestpulse_core::{GuestPulseError, Review, ServiceKey};
use tracing::debug;

const NOT_RATED: &str = "N/A";

fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

fn csv_err(e: csv::Error) -> GuestPulseError {
    GuestPulseError::Internal(format!("csv export failed: {e}"))
}

/// Column headers: guest metadata, one column per service, then the answers.
pub fn headers() -> Vec<&'static str> {
    let mut headers = vec!["Name", "Nationality", "Age", "Room", "Date", "Overall"];
    headers.extend(ServiceKey::all().map(ServiceKey::display_name));
    headers.extend(["Recommend", "Visit Again", "Suggestions"]);
    headers
}

fn record(review: &Review) -> Vec<String> {
    let mut row = vec![
        review.full_name.clone(),
        review.nationality.clone(),
        review.age.map(|a| a.to_string()).unwrap_or_default(),
        review.room_number.clone(),
        review.submitted_at.format("%Y-%m-%d").to_string(),
        review.overall_rating.to_string(),
    ];
    row.extend(ServiceKey::all().map(|key| match review.services.get(&key) {
        Some(s) if s.rating > 0 => s.rating.to_string(),
        _ => NOT_RATED.to_string(),
    }));
    row.push(yes_no(review.recommend).to_string());
    row.push(yes_no(review.visit_again).to_string());
    row.push(review.suggestions.clone().unwrap_or_default());
    row
}

/// Write the header row and one row per review.
pub fn write_reviews_csv<W: Write>(reviews: &[Review], out: W) -> Result<(), GuestPulseError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(headers()).map_err(csv_err)?;
    for review in reviews {
        writer.write_record(record(review)).map_err(csv_err)?;
    }
    writer.flush().map_err(GuestPulseError::storage)?;
    debug!(rows = reviews.len(), "review csv written");
    Ok(())
}

pub fn reviews_to_csv(reviews: &[Review]) -> Result<String, GuestPulseError> {
    let mut buf = Vec::new();
    write_reviews_csv(reviews, &mut buf)?;
    String::from_utf8(buf).map_err(|e| GuestPulseError::Internal(e.to_string()))
}

/// `hotel-reviews-detailed-<YYYY-MM-DD>.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("hotel-reviews-detailed-{}.csv", date.format("%Y-%m-%d"))
}
