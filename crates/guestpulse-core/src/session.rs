// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Voting sessions: time-boxed feedback windows shared through a slug link.
//!
//! Lifecycle:
//!
//! ```text
//! draft --start--> active --pause--> paused --resume--> active
//!                  active --stop---> completed
//!                  paused --stop---> completed
//!                  active --(end_time passed, detected on read)--> expired
//! ```
//!
//! `completed` and `expired` are terminal. Expiry is never swept in the
//! background: readers call [`VotingSession::is_overdue`] and persist the
//! correction themselves.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::GuestPulseError;

/// Stored status of a voting session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionStatus {
    Draft,
    Active,
    Paused,
    Completed,
    Expired,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Expired)
    }
}

/// Operator-triggered transition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionAction {
    Start,
    Pause,
    Resume,
    Stop,
}

/// A voting session row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VotingSession {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: u32,
    pub status: SessionStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub unique_link_slug: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a create request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub auto_start: Option<bool>,
}

/// Body of an update request. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub action: Option<SessionAction>,
}

/// Column-level partial update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<u32>,
    pub status: Option<SessionStatus>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl SessionPatch {
    pub fn is_empty(&self) -> bool {
        *self == SessionPatch::default()
    }

    /// A patch that only rewrites the status.
    pub fn status(status: SessionStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

fn validate_title(title: &str) -> Result<String, GuestPulseError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(GuestPulseError::Validation("Title is required".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Accepted session length in minutes, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationLimits {
    pub min: u32,
    pub max: u32,
}

impl Default for DurationLimits {
    fn default() -> Self {
        Self { min: 5, max: 480 }
    }
}

impl DurationLimits {
    fn error(&self) -> GuestPulseError {
        GuestPulseError::Validation(format!(
            "Duration must be between {} and {} minutes",
            self.min, self.max
        ))
    }

    /// Check a requested duration against the bounds.
    pub fn check(&self, minutes: i64) -> Result<u32, GuestPulseError> {
        u32::try_from(minutes)
            .ok()
            .filter(|m| (self.min..=self.max).contains(m))
            .ok_or_else(|| self.error())
    }
}

fn window(start: DateTime<Utc>, minutes: u32) -> (DateTime<Utc>, DateTime<Utc>) {
    (start, start + Duration::minutes(i64::from(minutes)))
}

impl VotingSession {
    /// Build a new session from a create request.
    ///
    /// With `autoStart` the session opens immediately and its window runs for
    /// `duration` minutes from `now`.
    pub fn create(
        input: NewSession,
        limits: &DurationLimits,
        id: String,
        slug: String,
        created_by: String,
        now: DateTime<Utc>,
    ) -> Result<Self, GuestPulseError> {
        let title = validate_title(input.title.as_deref().unwrap_or(""))?;
        let duration_minutes = match input.duration {
            Some(minutes) => limits.check(minutes)?,
            None => return Err(limits.error()),
        };

        let (status, start_time, end_time) = if input.auto_start.unwrap_or(false) {
            let (s, e) = window(now, duration_minutes);
            (SessionStatus::Active, Some(s), Some(e))
        } else {
            (SessionStatus::Draft, None, None)
        };

        Ok(Self {
            id,
            title,
            description: input.description.filter(|d| !d.trim().is_empty()),
            duration_minutes,
            status,
            start_time,
            end_time,
            unique_link_slug: slug,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    /// Compute the patch for an operator action, rejecting illegal transitions.
    pub fn transition(
        &self,
        action: SessionAction,
        now: DateTime<Utc>,
    ) -> Result<SessionPatch, GuestPulseError> {
        use SessionAction::*;
        use SessionStatus::*;

        match (action, self.status) {
            (Start, Draft) | (Resume, Paused) => {
                // Resume restarts the countdown with the full duration.
                let (s, e) = window(now, self.duration_minutes);
                Ok(SessionPatch {
                    status: Some(Active),
                    start_time: Some(s),
                    end_time: Some(e),
                    ..SessionPatch::default()
                })
            }
            (Pause, Active) => Ok(SessionPatch::status(Paused)),
            (Stop, Active) | (Stop, Paused) => Ok(SessionPatch::status(Completed)),
            (action, status) => Err(GuestPulseError::Validation(format!(
                "cannot {action} session in state {status}"
            ))),
        }
    }

    /// Turn an update request into a patch. Field edits and an optional action
    /// may be combined; the action is applied after the edits.
    pub fn plan_update(
        &self,
        update: &SessionUpdate,
        limits: &DurationLimits,
        now: DateTime<Utc>,
    ) -> Result<SessionPatch, GuestPulseError> {
        let mut patch = SessionPatch {
            title: update.title.as_deref().map(validate_title).transpose()?,
            description: update.description.clone(),
            duration_minutes: update.duration.map(|m| limits.check(m)).transpose()?,
            ..SessionPatch::default()
        };

        if let Some(action) = update.action {
            let mut staged = self.clone();
            if let Some(minutes) = patch.duration_minutes {
                staged.duration_minutes = minutes;
            }
            let step = staged.transition(action, now)?;
            patch.status = step.status;
            patch.start_time = step.start_time;
            patch.end_time = step.end_time;
        } else if let (Some(minutes), SessionStatus::Active, Some(start)) =
            (patch.duration_minutes, self.status, self.start_time)
        {
            // A running window is stretched or shrunk in place.
            patch.end_time = Some(window(start, minutes).1);
        }

        Ok(patch)
    }

    /// Apply a patch in memory, mirroring the COALESCE update in storage.
    pub fn apply(&mut self, patch: &SessionPatch, now: DateTime<Utc>) {
        if let Some(t) = &patch.title {
            self.title = t.clone();
        }
        if let Some(d) = &patch.description {
            self.description = Some(d.clone());
        }
        if let Some(m) = patch.duration_minutes {
            self.duration_minutes = m;
        }
        if let Some(s) = patch.status {
            self.status = s;
        }
        if let Some(s) = patch.start_time {
            self.start_time = Some(s);
        }
        if let Some(e) = patch.end_time {
            self.end_time = Some(e);
        }
        self.updated_at = now;
    }

    /// Stored as active but the window has closed.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == SessionStatus::Active && self.end_time.is_some_and(|end| end <= now)
    }

    /// Status as of `now`, with lazy expiry applied.
    pub fn effective_status(&self, now: DateTime<Utc>) -> SessionStatus {
        if self.is_overdue(now) {
            SessionStatus::Expired
        } else {
            self.status
        }
    }
}

/// Outcome of checking a public voting link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkVerdict {
    Open,
    NotFound,
    NotStarted,
    Paused,
    Completed,
    Expired,
}

impl LinkVerdict {
    pub fn is_open(self) -> bool {
        self == LinkVerdict::Open
    }

    /// Machine-readable reason.
    pub fn reason(self) -> &'static str {
        match self {
            LinkVerdict::Open => "open",
            LinkVerdict::NotFound => "not_found",
            LinkVerdict::NotStarted => "not_started",
            LinkVerdict::Paused => "paused",
            LinkVerdict::Completed => "completed",
            LinkVerdict::Expired => "expired",
        }
    }

    /// HTTP status a transport should use for this verdict.
    pub fn http_status(self) -> u16 {
        match self {
            LinkVerdict::Open => 200,
            LinkVerdict::NotFound => 404,
            LinkVerdict::NotStarted | LinkVerdict::Paused => 403,
            LinkVerdict::Completed | LinkVerdict::Expired => 410,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            LinkVerdict::Open => "Voting session is open.",
            LinkVerdict::NotFound => "Voting session not found",
            LinkVerdict::NotStarted => "Voting session is not yet active.",
            LinkVerdict::Paused => "Voting session is currently paused.",
            LinkVerdict::Completed => "Voting session has been completed.",
            LinkVerdict::Expired => "Voting session has expired.",
        }
    }

    /// The verdict as an error, for callers that only proceed on `Open`.
    pub fn into_result(self) -> Result<(), GuestPulseError> {
        let message = self.message().to_string();
        match self {
            LinkVerdict::Open => Ok(()),
            LinkVerdict::NotFound => Err(GuestPulseError::NotFound(message)),
            LinkVerdict::NotStarted | LinkVerdict::Paused => {
                Err(GuestPulseError::Forbidden(message))
            }
            LinkVerdict::Completed | LinkVerdict::Expired => Err(GuestPulseError::Gone(message)),
        }
    }
}

/// Decide whether a slug link accepts votes at `now`.
///
/// The time check wins over the stored status: an active session whose
/// window has closed is reported as expired even before storage catches up.
pub fn verify_link(session: Option<&VotingSession>, now: DateTime<Utc>) -> LinkVerdict {
    let Some(session) = session else {
        return LinkVerdict::NotFound;
    };
    match session.status {
        SessionStatus::Draft => LinkVerdict::NotStarted,
        SessionStatus::Paused => LinkVerdict::Paused,
        SessionStatus::Completed => LinkVerdict::Completed,
        SessionStatus::Expired => LinkVerdict::Expired,
        SessionStatus::Active => {
            if session.start_time.is_some_and(|start| start > now) {
                LinkVerdict::NotStarted
            } else if session.is_overdue(now) {
                LinkVerdict::Expired
            } else {
                LinkVerdict::Open
            }
        }
    }
}
