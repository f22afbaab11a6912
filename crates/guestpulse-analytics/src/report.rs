// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The admin dashboard payload.

use guestpulse_core::Review;
use serde::Serialize;

use crate::nps::NpsSummary;
use crate::services::{self, ServiceAverage};
use crate::trend::{self, TrendPoint};
use crate::{percentage, round_to};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub total_reviews: usize,
    pub nps: NpsSummary,
    /// Percentages, one decimal.
    pub recommendation_rate: f64,
    pub visit_again_rate: f64,
    /// Mean overall rating (0-10), one decimal.
    pub average_overall_rating: f64,
    pub service_average: f64,
    pub service_averages: Vec<ServiceAverage>,
    pub low_rated_services: Vec<ServiceAverage>,
    pub trend: Vec<TrendPoint>,
}

impl DashboardReport {
    pub fn build(reviews: &[Review]) -> Self {
        let total = reviews.len();
        let service_averages = services::service_averages(reviews);
        let overall_sum: u32 = reviews.iter().map(|r| u32::from(r.overall_rating)).sum();

        Self {
            total_reviews: total,
            nps: NpsSummary::from_ratings(reviews.iter().map(|r| r.overall_rating)),
            recommendation_rate: round_to(
                percentage(reviews.iter().filter(|r| r.recommend).count(), total),
                1,
            ),
            visit_again_rate: round_to(
                percentage(reviews.iter().filter(|r| r.visit_again).count(), total),
                1,
            ),
            average_overall_rating: if total == 0 {
                0.0
            } else {
                round_to(f64::from(overall_sum) / total as f64, 1)
            },
            service_average: services::overall_service_average(&service_averages),
            low_rated_services: services::low_rated(&service_averages),
            service_averages,
            trend: trend::daily_trend(reviews),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use guestpulse_core::{ServiceKey, ServiceRating};
    use std::collections::BTreeMap;

    fn review(i: i64, overall: u8, recommend: bool, visit_again: bool, spa: u8) -> Review {
        let mut services = BTreeMap::new();
        services.insert(ServiceKey::Spa, ServiceRating { rating: spa, comment: None });
        Review {
            id: format!("r-{i}"),
            full_name: "Anonymous".into(),
            nationality: "Not specified".into(),
            age: None,
            room_number: "N/A".into(),
            submitted_at: Utc.with_ymd_and_hms(2026, 5, 1, 10, 0, 0).unwrap() + Duration::days(i),
            overall_rating: overall,
            recommend,
            visit_again,
            services,
            suggestions: None,
            created_by: "x".into(),
        }
    }

    #[test]
    fn report_over_reviews() {
        let reviews = [
            review(0, 10, true, true, 2),
            review(1, 9, true, false, 2),
            review(1, 5, false, false, 1),
        ];
        let report = DashboardReport::build(&reviews);
        assert_eq!(report.total_reviews, 3);
        assert_eq!(report.nps.score, 33);
        assert_eq!(report.recommendation_rate, 66.7);
        assert_eq!(report.visit_again_rate, 33.3);
        assert_eq!(report.average_overall_rating, 8.0);
        assert_eq!(report.service_average, 1.7);
        assert_eq!(report.low_rated_services.len(), 1);
        assert_eq!(report.low_rated_services[0].service, ServiceKey::Spa);
        assert_eq!(report.trend.len(), 2);
    }

    #[test]
    fn empty_report_is_all_zero() {
        let report = DashboardReport::build(&[]);
        assert_eq!(report.total_reviews, 0);
        assert_eq!(report.nps.score, 0);
        assert_eq!(report.recommendation_rate, 0.0);
        assert_eq!(report.average_overall_rating, 0.0);
        assert!(report.low_rated_services.is_empty());
        assert_eq!(report.service_averages.len(), 15);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("lowRatedServices").is_some());
        assert_eq!(json["nps"]["category"], "Needs Improvement");
    }
}
