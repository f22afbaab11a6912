// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily average overall rating.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use guestpulse_core::Review;
use serde::Serialize;

use crate::round_to;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub total_rating: u32,
    pub count: u32,
    /// One decimal.
    pub average: f64,
}

/// Group reviews by UTC calendar day, oldest day first.
pub fn daily_trend(reviews: &[Review]) -> Vec<TrendPoint> {
    let mut days: BTreeMap<NaiveDate, (u32, u32)> = BTreeMap::new();
    for review in reviews {
        let day = days.entry(review.submitted_at.date_naive()).or_default();
        day.0 += u32::from(review.overall_rating);
        day.1 += 1;
    }
    days.into_iter()
        .map(|(date, (total_rating, count))| TrendPoint {
            date,
            total_rating,
            count,
            average: round_to(f64::from(total_rating) / f64::from(count), 1),
        })
        .collect()
}
