// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Net Promoter Score.
//!
//! Overall ratings 9-10 are promoters, 7-8 passives and 0-6 detractors.
//! The score is `(promoters - detractors) / total * 100`, rounded to an integer,
//! so it always lies in `-100..=100`.

use serde::Serialize;
use strum::{Display, EnumString};

/// Which NPS group a single overall rating falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NpsBucket {
    Promoter,
    Passive,
    Detractor,
}

impl NpsBucket {
    pub fn of(overall_rating: u8) -> Self {
        match overall_rating {
            9.. => NpsBucket::Promoter,
            7..=8 => NpsBucket::Passive,
            _ => NpsBucket::Detractor,
        }
    }
}

/// Dashboard label for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum NpsCategory {
    #[strum(serialize = "Needs Improvement")]
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
    Good,
    Great,
    Excellent,
    #[strum(serialize = "World Class")]
    #[serde(rename = "World Class")]
    WorldClass,
}

impl NpsCategory {
    pub fn for_score(score: i32) -> Self {
        match score {
            ..=0 => NpsCategory::NeedsImprovement,
            1..=30 => NpsCategory::Good,
            31..=50 => NpsCategory::Great,
            51..=70 => NpsCategory::Excellent,
            _ => NpsCategory::WorldClass,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NpsSummary {
    pub promoters: usize,
    pub passives: usize,
    pub detractors: usize,
    pub total: usize,
    pub score: i32,
    pub category: NpsCategory,
    pub promoter_percentage: f64,
    pub detractor_percentage: f64,
}

impl NpsSummary {
    pub fn from_ratings(ratings: impl IntoIterator<Item = u8>) -> Self {
        let (mut promoters, mut passives, mut detractors) = (0, 0, 0);
        for rating in ratings {
            match NpsBucket::of(rating) {
                NpsBucket::Promoter => promoters += 1,
                NpsBucket::Passive => passives += 1,
                NpsBucket::Detractor => detractors += 1,
            }
        }
        let total = promoters + passives + detractors;
        let score = if total == 0 {
            0
        } else {
            // Half-way values round toward +inf, e.g. -12.5 -> -12.
            let raw = (promoters as f64 - detractors as f64) / total as f64 * 100.0;
            (raw + 0.5).floor() as i32
        };
        Self {
            promoters,
            passives,
            detractors,
            total,
            score,
            category: NpsCategory::for_score(score),
            promoter_percentage: crate::round_to(crate::percentage(promoters, total), 1),
            detractor_percentage: crate::round_to(crate::percentage(detractors, total), 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn buckets() {
        assert_eq!(NpsBucket::of(10), NpsBucket::Promoter);
        assert_eq!(NpsBucket::of(9), NpsBucket::Promoter);
        assert_eq!(NpsBucket::of(8), NpsBucket::Passive);
        assert_eq!(NpsBucket::of(7), NpsBucket::Passive);
        assert_eq!(NpsBucket::of(6), NpsBucket::Detractor);
        assert_eq!(NpsBucket::of(0), NpsBucket::Detractor);
        assert_eq!(NpsBucket::Passive.to_string(), "passive");
    }

    #[test]
    fn category_boundaries() {
        assert_eq!(NpsCategory::for_score(-100), NpsCategory::NeedsImprovement);
        assert_eq!(NpsCategory::for_score(0), NpsCategory::NeedsImprovement);
        assert_eq!(NpsCategory::for_score(1), NpsCategory::Good);
        assert_eq!(NpsCategory::for_score(30), NpsCategory::Good);
        assert_eq!(NpsCategory::for_score(50), NpsCategory::Great);
        assert_eq!(NpsCategory::for_score(70), NpsCategory::Excellent);
        assert_eq!(NpsCategory::for_score(71), NpsCategory::WorldClass);
        assert_eq!(NpsCategory::WorldClass.to_string(), "World Class");
    }

    #[test]
    fn empty_input_scores_zero() {
        let s = NpsSummary::from_ratings([]);
        assert_eq!(s.score, 0);
        assert_eq!(s.total, 0);
        assert_eq!(s.category, NpsCategory::NeedsImprovement);
    }

    #[test]
    fn mixed_ratings() {
        // 2 promoters, 1 passive, 1 detractor -> (2 - 1) / 4 = 25
        let s = NpsSummary::from_ratings([10, 9, 8, 3]);
        assert_eq!((s.promoters, s.passives, s.detractors), (2, 1, 1));
        assert_eq!(s.score, 25);
        assert_eq!(s.category, NpsCategory::Good);
        assert_eq!(s.promoter_percentage, 50.0);
    }

    #[test]
    fn half_scores_round_up() {
        // 3 promoters, 5 detractors out of 16 -> -12.5
        let mut ratings = vec![10; 3];
        ratings.extend([0; 5]);
        ratings.extend([7; 8]);
        assert_eq!(NpsSummary::from_ratings(ratings).score, -12);
    }

    #[test]
    fn category_serializes_as_label() {
        let s = NpsSummary::from_ratings([10, 10]);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["category"], "World Class");
        assert_eq!(json["score"], 100);
    }

    proptest! {
        #[test]
        fn score_is_bounded(ratings in proptest::collection::vec(0u8..=10, 0..200)) {
            let s = NpsSummary::from_ratings(ratings.iter().copied());
            prop_assert!((-100..=100).contains(&s.score));
            prop_assert_eq!(s.promoters + s.passives + s.detractors, ratings.len());
        }

        #[test]
        fn all_promoters_score_100(n in 1usize..100) {
            prop_assert_eq!(NpsSummary::from_ratings(std::iter::repeat_n(9u8, n)).score, 100);
        }
    }
}
