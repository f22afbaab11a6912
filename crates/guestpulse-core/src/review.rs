// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Guest reviews and the enumerated services they rate.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::GuestPulseError;
use crate::types::SEED_ADMIN_ID;

/// Highest allowed overall rating.
pub const MAX_OVERALL_RATING: u8 = 10;

/// A rated aspect of the stay. Declaration order is the export column order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ServiceKey {
    Reception,
    RoomQuality,
    RoomComfort,
    RestaurantMainService,
    RestaurantMainQuality,
    RestaurantBarbecueService,
    RestaurantBarbecueQuality,
    RestaurantInternationalService,
    RestaurantInternationalQuality,
    AnimationDay,
    AnimationEvening,
    Bar,
    Pool,
    Spa,
    Cleanliness,
}

impl ServiceKey {
    /// Human-readable label used in dashboards and CSV headers.
    pub fn display_name(self) -> &'static str {
        match self {
            ServiceKey::Reception => "Reception",
            ServiceKey::RoomQuality => "Room Quality",
            ServiceKey::RoomComfort => "Room Comfort",
            ServiceKey::RestaurantMainService => "Main Restaurant Service",
            ServiceKey::RestaurantMainQuality => "Main Restaurant Quality",
            ServiceKey::RestaurantBarbecueService => "BBQ Restaurant Service",
            ServiceKey::RestaurantBarbecueQuality => "BBQ Restaurant Quality",
            ServiceKey::RestaurantInternationalService => "International Restaurant Service",
            ServiceKey::RestaurantInternationalQuality => "International Restaurant Quality",
            ServiceKey::AnimationDay => "Day Animation",
            ServiceKey::AnimationEvening => "Evening Animation",
            ServiceKey::Bar => "Bar",
            ServiceKey::Pool => "Pool",
            ServiceKey::Spa => "Spa",
            ServiceKey::Cleanliness => "Cleanliness",
        }
    }

    /// All services in declaration order.
    pub fn all() -> impl Iterator<Item = ServiceKey> {
        ServiceKey::iter()
    }
}

/// A 1-5 rating of one service with an optional comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRating {
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A stored guest review. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub full_name: String,
    pub nationality: String,
    pub age: Option<u8>,
    pub room_number: String,
    pub submitted_at: DateTime<Utc>,
    pub overall_rating: u8,
    pub recommend: bool,
    pub visit_again: bool,
    pub services: BTreeMap<ServiceKey, ServiceRating>,
    pub suggestions: Option<String>,
    pub created_by: String,
}

/// Raw service rating as submitted by the form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceRatingInput {
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Review submission body. Every field is optional at the wire level so that
/// missing fields produce a precise validation message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    #[serde(default)]
    pub overall_rating: Option<i64>,
    #[serde(default)]
    pub services: Option<BTreeMap<String, ServiceRatingInput>>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub room_number: Option<String>,
    #[serde(default)]
    pub recommend: Option<bool>,
    #[serde(default)]
    pub visit_again: Option<bool>,
    #[serde(default)]
    pub suggestions: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
}

fn non_blank(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => default.to_string(),
    }
}

impl NewReview {
    /// Validate the submission and turn it into a storable review.
    pub fn into_review(self, id: String, now: DateTime<Utc>) -> Result<Review, GuestPulseError> {
        let overall = self.overall_rating.ok_or_else(|| {
            GuestPulseError::Validation("Missing required field: overallRating".to_string())
        })?;
        let raw_services = self.services.ok_or_else(|| {
            GuestPulseError::Validation("Missing required field: services".to_string())
        })?;

        if !(0..=i64::from(MAX_OVERALL_RATING)).contains(&overall) {
            return Err(GuestPulseError::Validation(format!(
                "overallRating must be between 0 and {MAX_OVERALL_RATING}"
            )));
        }

        let mut services = BTreeMap::new();
        for (name, input) in raw_services {
            let key = ServiceKey::from_str(&name)
                .map_err(|_| GuestPulseError::Validation(format!("Unknown service: {name}")))?;
            match input.rating {
                // 0 or absent means the guest skipped this service.
                None | Some(0) => continue,
                Some(r) if (1..=5).contains(&r) => {
                    let comment = input.comment.filter(|c| !c.trim().is_empty());
                    services.insert(
                        key,
                        ServiceRating {
                            rating: r as u8,
                            comment,
                        },
                    );
                }
                Some(r) => {
                    return Err(GuestPulseError::Validation(format!(
                        "Rating for {name} must be between 1 and 5, got {r}"
                    )));
                }
            }
        }

        let age = match self.age {
            None => None,
            Some(a) if (18..=120).contains(&a) => Some(a as u8),
            Some(a) => {
                return Err(GuestPulseError::Validation(format!(
                    "age must be between 18 and 120, got {a}"
                )));
            }
        };

        Ok(Review {
            id,
            full_name: non_blank(self.full_name, "Anonymous"),
            nationality: non_blank(self.nationality, "Not specified"),
            age,
            room_number: non_blank(self.room_number, "N/A"),
            submitted_at: now,
            overall_rating: overall as u8,
            recommend: self.recommend.unwrap_or(false),
            visit_again: self.visit_again.unwrap_or(false),
            services,
            suggestions: self.suggestions.filter(|s| !s.trim().is_empty()),
            created_by: non_blank(self.created_by, SEED_ADMIN_ID),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> NewReview {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn there_are_fifteen_services() {
        assert_eq!(ServiceKey::all().count(), 15);
        assert_eq!(ServiceKey::RoomQuality.to_string(), "roomQuality");
        assert_eq!(
            ServiceKey::from_str("restaurantBarbecueService").unwrap(),
            ServiceKey::RestaurantBarbecueService
        );
        assert_eq!(ServiceKey::AnimationDay.display_name(), "Day Animation");
    }

    #[test]
    fn missing_services_is_reported_by_name() {
        let err = parse(r#"{"overallRating": 8}"#)
            .into_review("r".into(), Utc::now())
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: services");
    }

    #[test]
    fn missing_overall_rating_is_reported_first() {
        let err = parse(r#"{}"#).into_review("r".into(), Utc::now()).unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: overallRating");
    }

    #[test]
    fn defaults_fill_guest_metadata() {
        let review = parse(r#"{"overallRating": 9, "services": {"pool": {"rating": 5}}}"#)
            .into_review("r-1".into(), Utc::now())
            .unwrap();
        assert_eq!(review.full_name, "Anonymous");
        assert_eq!(review.nationality, "Not specified");
        assert_eq!(review.room_number, "N/A");
        assert_eq!(review.created_by, SEED_ADMIN_ID);
        assert_eq!(review.services[&ServiceKey::Pool].rating, 5);
    }

    #[test]
    fn unrated_services_are_dropped() {
        let review = parse(
            r#"{"overallRating": 7, "services": {"spa": {"rating": 0}, "bar": {"rating": 4, "comment": " "}}}"#,
        )
        .into_review("r".into(), Utc::now())
        .unwrap();
        assert_eq!(review.services.len(), 1);
        assert_eq!(review.services[&ServiceKey::Bar].comment, None);
    }

    #[test]
    fn out_of_range_values_rejected() {
        assert!(parse(r#"{"overallRating": 11, "services": {}}"#)
            .into_review("r".into(), Utc::now())
            .is_err());
        assert!(parse(r#"{"overallRating": 5, "services": {"spa": {"rating": 6}}}"#)
            .into_review("r".into(), Utc::now())
            .is_err());
        assert!(parse(r#"{"overallRating": 5, "services": {}, "age": 12}"#)
            .into_review("r".into(), Utc::now())
            .is_err());
    }

    #[test]
    fn unknown_service_rejected() {
        let err = parse(r#"{"overallRating": 5, "services": {"sauna": {"rating": 3}}}"#)
            .into_review("r".into(), Utc::now())
            .unwrap_err();
        assert!(err.to_string().contains("sauna"));
    }
}
