// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dashboard review filters: free-text search plus a time window.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use guestpulse_core::{GuestPulseError, Review};
use serde::Deserialize;
use strum::{Display, EnumString};

/// A rolling window ending now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Deserialize)]
pub enum Period {
    #[default]
    #[strum(serialize = "all")]
    #[serde(rename = "all")]
    All,
    #[strum(serialize = "24h")]
    #[serde(rename = "24h")]
    Day,
    #[strum(serialize = "7d")]
    #[serde(rename = "7d")]
    Week,
    #[strum(serialize = "30d")]
    #[serde(rename = "30d")]
    Month,
    #[strum(serialize = "90d")]
    #[serde(rename = "90d")]
    Quarter,
}

impl Period {
    fn length(self) -> Option<Duration> {
        match self {
            Period::All => None,
            Period::Day => Some(Duration::hours(24)),
            Period::Week => Some(Duration::days(7)),
            Period::Month => Some(Duration::days(30)),
            Period::Quarter => Some(Duration::days(90)),
        }
    }
}

/// Query-string filter accepted by the analytics and export endpoints.
///
/// An explicit `from`/`to` range (inclusive calendar days) takes precedence
/// over `period`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub period: Period,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl ReviewFilter {
    pub fn validate(&self) -> Result<(), GuestPulseError> {
        if let (Some(from), Some(to)) = (self.from, self.to)
            && from > to
        {
            return Err(GuestPulseError::Validation(
                "from must not be after to".to_string(),
            ));
        }
        Ok(())
    }

    pub fn matches(&self, review: &Review, now: DateTime<Utc>) -> bool {
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let hit = [&review.full_name, &review.nationality, &review.room_number]
                .iter()
                .any(|field| field.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }

        let day = review.submitted_at.date_naive();
        match (self.from, self.to) {
            (Some(from), Some(to)) => from <= day && day <= to,
            _ => match self.period.length() {
                Some(length) => review.submitted_at >= now - length,
                None => true,
            },
        }
    }

    pub fn apply(&self, reviews: Vec<Review>, now: DateTime<Utc>) -> Vec<Review> {
        reviews.into_iter().filter(|r| self.matches(r, now)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeMap;
    use std::str::FromStr;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 20, 12, 0, 0).unwrap()
    }

    fn review(name: &str, room: &str, days_ago: i64) -> Review {
        Review {
            id: name.into(),
            full_name: name.into(),
            nationality: "Portuguese".into(),
            age: None,
            room_number: room.into(),
            submitted_at: now() - Duration::days(days_ago),
            overall_rating: 9,
            recommend: true,
            visit_again: true,
            services: BTreeMap::new(),
            suggestions: None,
            created_by: "x".into(),
        }
    }

    #[test]
    fn search_is_case_insensitive_over_name_nationality_room() {
        let filter = ReviewFilter {
            search: Some("ROOM-2".into()),
            ..ReviewFilter::default()
        };
        assert!(filter.matches(&review("Ana", "room-204", 0), now()));
        assert!(!filter.matches(&review("Ana", "101", 0), now()));

        let by_nationality = ReviewFilter {
            search: Some("portu".into()),
            ..ReviewFilter::default()
        };
        assert!(by_nationality.matches(&review("Ana", "101", 0), now()));
    }

    #[test]
    fn period_limits_age() {
        let filter = ReviewFilter {
            period: Period::Week,
            ..ReviewFilter::default()
        };
        let kept = filter.apply(vec![review("a", "1", 3), review("b", "1", 10)], now());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "a");
        assert_eq!(Period::from_str("30d").unwrap(), Period::Month);
    }

    #[test]
    fn explicit_range_overrides_period() {
        let filter = ReviewFilter {
            period: Period::Day,
            from: Some(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()),
            to: Some(NaiveDate::from_ymd_opt(2026, 8, 10).unwrap()),
            ..ReviewFilter::default()
        };
        assert!(filter.matches(&review("a", "1", 10), now()));
        assert!(!filter.matches(&review("b", "1", 0), now()));
    }

    #[test]
    fn inverted_range_is_invalid() {
        let filter = ReviewFilter {
            from: Some(NaiveDate::from_ymd_opt(2026, 8, 10).unwrap()),
            to: Some(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()),
            ..ReviewFilter::default()
        };
        assert!(filter.validate().is_err());
    }
}
