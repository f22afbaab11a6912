// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit trail entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::unique_id;

/// Actions the server records on its own.
///
/// Clients may post any other action string; it is stored verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    VotingSessionCreated,
    VotingSessionUpdated,
    VotingSessionDeleted,
    SessionStarted,
    SessionPaused,
    SessionResumed,
    SessionStopped,
    SessionExpired,
    UserCreated,
    UserUpdated,
    UserDeleted,
    PasswordChanged,
    Login,
    Logout,
}

impl From<AuditAction> for String {
    fn from(action: AuditAction) -> Self {
        action.to_string()
    }
}

/// One line of the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub action: String,
    pub user: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub details: String,
}

/// Append an entry with a fresh id and return a copy of it.
pub(crate) fn append(
    entries: &mut Vec<AuditEntry>,
    action: String,
    user: String,
    details: String,
    now: DateTime<Utc>,
) -> AuditEntry {
    let id = unique_id("audit", now, |candidate| {
        entries.iter().any(|e| e.id == candidate)
    });
    let entry = AuditEntry {
        id,
        action,
        user,
        timestamp: now,
        details,
    };
    entries.push(entry.clone());
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    #[test]
    fn actions_render_screaming_snake_case() {
        assert_eq!(AuditAction::VotingSessionCreated.to_string(), "VOTING_SESSION_CREATED");
        assert_eq!(AuditAction::SessionExpired.as_ref(), "SESSION_EXPIRED");
        assert_eq!(AuditAction::from_str("PASSWORD_CHANGED").unwrap(), AuditAction::PasswordChanged);
        assert_eq!(String::from(AuditAction::Logout), "LOGOUT");
    }

    #[test]
    fn same_millisecond_entries_get_distinct_ids() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut entries = Vec::new();
        let a = append(&mut entries, "LOGIN".into(), "admin".into(), String::new(), now);
        let b = append(&mut entries, "LOGOUT".into(), "admin".into(), String::new(), now);
        assert_ne!(a.id, b.id);
        assert!(b.id.starts_with(&a.id));
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn entry_without_details_deserializes() {
        let json = r#"{"id":"audit-1","action":"CUSTOM","user":"x","timestamp":"2026-01-01T00:00:00Z"}"#;
        let entry: AuditEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.details, "");
        assert_eq!(entry.action, "CUSTOM");
    }
}
