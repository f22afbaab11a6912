// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-service average ratings.

use guestpulse_core::{Review, ServiceKey};
use serde::Serialize;
use strum::Display;

use crate::round_to;

/// Averages below this mark a service as needing attention.
pub const LOW_RATING_THRESHOLD: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ServiceStatus {
    pub fn for_average(average: f64) -> Self {
        if average >= 4.0 {
            ServiceStatus::Excellent
        } else if average >= 3.0 {
            ServiceStatus::Good
        } else if average >= 2.0 {
            ServiceStatus::Fair
        } else {
            ServiceStatus::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAverage {
    pub service: ServiceKey,
    pub name: &'static str,
    /// Mean of the submitted ratings, two decimals. 0 when nobody rated it.
    pub average: f64,
    pub count: usize,
    pub status: ServiceStatus,
}

impl ServiceAverage {
    pub fn is_low_rated(&self) -> bool {
        self.count > 0 && self.average < LOW_RATING_THRESHOLD
    }
}

/// One entry per known service, in declaration order.
pub fn service_averages(reviews: &[Review]) -> Vec<ServiceAverage> {
    ServiceKey::all()
        .map(|service| {
            let (sum, count) = reviews
                .iter()
                .filter_map(|r| r.services.get(&service))
                .filter(|s| s.rating > 0)
                .fold((0u32, 0usize), |(sum, count), s| {
                    (sum + u32::from(s.rating), count + 1)
                });
            let average = if count == 0 {
                0.0
            } else {
                round_to(f64::from(sum) / count as f64, 2)
            };
            ServiceAverage {
                service,
                name: service.display_name(),
                average,
                count,
                status: ServiceStatus::for_average(average),
            }
        })
        .collect()
}

pub fn low_rated(averages: &[ServiceAverage]) -> Vec<ServiceAverage> {
    averages.iter().filter(|a| a.is_low_rated()).cloned().collect()
}

/// Mean of the per-service averages over services that were rated at all, one decimal.
pub fn overall_service_average(averages: &[ServiceAverage]) -> f64 {
    let rated: Vec<f64> = averages
        .iter()
        .filter(|a| a.count > 0)
        .map(|a| a.average)
        .collect();
    if rated.is_empty() {
        return 0.0;
    }
    round_to(rated.iter().sum::<f64>() / rated.len() as f64, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use guestpulse_core::ServiceRating;
    use std::collections::BTreeMap;

    fn review(ratings: &[(ServiceKey, u8)]) -> Review {
        let services: BTreeMap<_, _> = ratings
            .iter()
            .map(|&(k, rating)| (k, ServiceRating { rating, comment: None }))
            .collect();
        Review {
            id: "r".into(),
            full_name: "Anonymous".into(),
            nationality: "Not specified".into(),
            age: None,
            room_number: "N/A".into(),
            submitted_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            overall_rating: 8,
            recommend: true,
            visit_again: true,
            services,
            suggestions: None,
            created_by: "x".into(),
        }
    }

    #[test]
    fn averages_skip_unrated_services() {
        let reviews = [
            review(&[(ServiceKey::Pool, 5), (ServiceKey::Spa, 2)]),
            review(&[(ServiceKey::Pool, 4)]),
            review(&[(ServiceKey::Pool, 4)]),
        ];
        let averages = service_averages(&reviews);
        assert_eq!(averages.len(), 15);

        let pool = averages.iter().find(|a| a.service == ServiceKey::Pool).unwrap();
        assert_eq!(pool.count, 3);
        assert_eq!(pool.average, 4.33);
        assert_eq!(pool.status, ServiceStatus::Excellent);
        assert_eq!(pool.name, "Pool");

        let bar = averages.iter().find(|a| a.service == ServiceKey::Bar).unwrap();
        assert_eq!((bar.count, bar.average), (0, 0.0));
        assert!(!bar.is_low_rated());
    }

    #[test]
    fn low_rated_requires_ratings() {
        let reviews = [review(&[(ServiceKey::Spa, 2), (ServiceKey::Bar, 3)])];
        let averages = service_averages(&reviews);
        let low = low_rated(&averages);
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].service, ServiceKey::Spa);
        assert_eq!(low[0].status, ServiceStatus::Fair);
    }

    #[test]
    fn overall_average_ignores_unrated() {
        let reviews = [review(&[(ServiceKey::Spa, 2), (ServiceKey::Bar, 5)])];
        assert_eq!(overall_service_average(&service_averages(&reviews)), 3.5);
        assert_eq!(overall_service_average(&service_averages(&[])), 0.0);
    }

    #[test]
    fn status_thresholds() {
        assert_eq!(ServiceStatus::for_average(4.0), ServiceStatus::Excellent);
        assert_eq!(ServiceStatus::for_average(3.99), ServiceStatus::Good);
        assert_eq!(ServiceStatus::for_average(2.0), ServiceStatus::Fair);
        assert_eq!(ServiceStatus::for_average(0.0), ServiceStatus::Poor);
    }
}
