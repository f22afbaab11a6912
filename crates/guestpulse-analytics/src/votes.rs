// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregates over the votes of one voting session.

use guestpulse_core::Vote;
use serde::Serialize;

use crate::{percentage, round_to};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSummary {
    pub count: usize,
    pub food_quality: f64,
    pub service_quality: f64,
    pub ambiance: f64,
    pub value_for_money: f64,
    pub overall_experience: f64,
    /// Percentage of voters who would recommend, one decimal.
    pub recommend_rate: f64,
}

impl VoteSummary {
    pub fn from_votes(votes: &[Vote]) -> Self {
        let count = votes.len();
        let mean = |pick: fn(&Vote) -> u8| {
            if count == 0 {
                return 0.0;
            }
            let sum: u32 = votes.iter().map(|v| u32::from(pick(v))).sum();
            round_to(f64::from(sum) / count as f64, 2)
        };
        Self {
            count,
            food_quality: mean(|v| v.food_quality),
            service_quality: mean(|v| v.service_quality),
            ambiance: mean(|v| v.ambiance),
            value_for_money: mean(|v| v.value_for_money),
            overall_experience: mean(|v| v.overall_experience),
            recommend_rate: round_to(
                percentage(votes.iter().filter(|v| v.would_recommend).count(), count),
                1,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn vote(food: u8, overall: u8, recommend: bool) -> Vote {
        Vote {
            id: "v".into(),
            session_id: "s".into(),
            food_quality: food,
            service_quality: 4,
            ambiance: 3,
            value_for_money: 5,
            overall_experience: overall,
            comments: None,
            would_recommend: recommend,
            submitted_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn averages_and_recommend_rate() {
        let summary = VoteSummary::from_votes(&[vote(5, 5, true), vote(4, 3, false), vote(4, 4, true)]);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.food_quality, 4.33);
        assert_eq!(summary.service_quality, 4.0);
        assert_eq!(summary.overall_experience, 4.0);
        assert_eq!(summary.recommend_rate, 66.7);
    }

    #[test]
    fn empty_session() {
        let summary = VoteSummary::from_votes(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.ambiance, 0.0);
        assert_eq!(summary.recommend_rate, 0.0);
    }
}
