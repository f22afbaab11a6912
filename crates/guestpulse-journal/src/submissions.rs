// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-IP record of the last review submission, used to discourage repeats.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub ip: String,
    pub timestamp: DateTime<Utc>,
}

/// Answer to "has this guest submitted recently?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionStatus {
    pub has_submitted_recently: bool,
    pub last_submission: Option<DateTime<Utc>>,
}

/// Insert or refresh the entry for `ip`.
pub(crate) fn upsert(items: &mut Vec<Submission>, ip: &str, now: DateTime<Utc>) -> Submission {
    match items.iter_mut().find(|s| s.ip == ip) {
        Some(existing) => {
            existing.timestamp = now;
            existing.clone()
        }
        None => {
            let entry = Submission {
                ip: ip.to_string(),
                timestamp: now,
            };
            items.push(entry.clone());
            entry
        }
    }
}

pub(crate) fn status(
    items: &[Submission],
    ip: &str,
    now: DateTime<Utc>,
    window: Duration,
) -> SubmissionStatus {
    match items.iter().find(|s| s.ip == ip) {
        Some(s) => SubmissionStatus {
            has_submitted_recently: now - s.timestamp < window,
            last_submission: Some(s.timestamp),
        },
        None => SubmissionStatus {
            has_submitted_recently: false,
            last_submission: None,
        },
    }
}
