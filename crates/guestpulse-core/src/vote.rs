// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Guest votes cast through a voting-session link.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GuestPulseError;

/// A persisted vote. Every criterion is rated 1-5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub id: String,
    pub session_id: String,
    pub food_quality: u8,
    pub service_quality: u8,
    pub ambiance: u8,
    pub value_for_money: u8,
    pub overall_experience: u8,
    pub comments: Option<String>,
    pub would_recommend: bool,
    pub submitted_at: DateTime<Utc>,
}

/// Body of a vote submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVote {
    #[serde(default)]
    pub food_quality: Option<i64>,
    #[serde(default)]
    pub service_quality: Option<i64>,
    #[serde(default)]
    pub ambiance: Option<i64>,
    #[serde(default)]
    pub value_for_money: Option<i64>,
    #[serde(default)]
    pub overall_experience: Option<i64>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub would_recommend: Option<bool>,
}

fn criterion(name: &str, value: Option<i64>) -> Result<u8, GuestPulseError> {
    match value {
        None => Err(GuestPulseError::Validation(format!(
            "Missing required field: {name}"
        ))),
        Some(v) if (1..=5).contains(&v) => Ok(v as u8),
        Some(v) => Err(GuestPulseError::Validation(format!(
            "{name} must be between 1 and 5, got {v}"
        ))),
    }
}

impl NewVote {
    pub fn into_vote(
        self,
        id: String,
        session_id: String,
        now: DateTime<Utc>,
    ) -> Result<Vote, GuestPulseError> {
        Ok(Vote {
            id,
            session_id,
            food_quality: criterion("foodQuality", self.food_quality)?,
            service_quality: criterion("serviceQuality", self.service_quality)?,
            ambiance: criterion("ambiance", self.ambiance)?,
            value_for_money: criterion("valueForMoney", self.value_for_money)?,
            overall_experience: criterion("overallExperience", self.overall_experience)?,
            comments: self.comments.filter(|c| !c.trim().is_empty()),
            would_recommend: self.would_recommend.unwrap_or(false),
            submitted_at: now,
        })
    }
}
