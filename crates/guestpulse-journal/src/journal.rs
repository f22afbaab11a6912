// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The [`Journal`] facade over the three JSON files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use guestpulse_config::model::{FeedbackConfig, JournalConfig};
use guestpulse_core::{AdapterType, GuestPulseError, HealthStatus, PluginAdapter};

use crate::audit::{self, AuditEntry};
use crate::notifications::{self, NewNotification, Notification, NotificationPatch};
use crate::store::JsonFileStore;
use crate::submissions::{self, Submission, SubmissionStatus};

pub const AUDIT_FILE: &str = "audit-logs-data.json";
pub const NOTIFICATIONS_FILE: &str = "notifications-data.json";
pub const SUBMISSIONS_FILE: &str = "user-submissions-data.json";

/// Audit trail, notifications and guest submission throttle.
pub struct Journal {
    dir: PathBuf,
    audit: JsonFileStore<AuditEntry>,
    notifications: JsonFileStore<Notification>,
    submissions: JsonFileStore<Submission>,
    submission_window: Duration,
}

impl Journal {
    pub fn new(dir: impl Into<PathBuf>, submission_window: Duration) -> Self {
        let dir = dir.into();
        Self {
            audit: JsonFileStore::new(dir.join(AUDIT_FILE)),
            notifications: JsonFileStore::new(dir.join(NOTIFICATIONS_FILE)),
            submissions: JsonFileStore::new(dir.join(SUBMISSIONS_FILE)),
            submission_window,
            dir,
        }
    }

    pub fn from_config(journal: &JournalConfig, feedback: &FeedbackConfig) -> Self {
        Self::new(
            &journal.data_dir,
            Duration::hours(i64::from(feedback.submission_window_hours)),
        )
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // --- Audit ---

    /// Append an audit entry.
    pub async fn record(
        &self,
        action: impl Into<String>,
        user: impl Into<String>,
        details: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<AuditEntry, GuestPulseError> {
        let action = action.into();
        if action.trim().is_empty() {
            return Err(GuestPulseError::Validation("Action is required".to_string()));
        }
        let (user, details) = (user.into(), details.into());
        let entry = self
            .audit
            .update(move |entries| Ok(audit::append(entries, action, user, details, now)))
            .await?;
        info!(action = %entry.action, user = %entry.user, "audit entry recorded");
        Ok(entry)
    }

    /// Audit entries, newest first.
    pub async fn audit_entries(&self) -> Result<Vec<AuditEntry>, GuestPulseError> {
        let mut entries = self.audit.load().await?;
        entries.reverse();
        Ok(entries)
    }

    // --- Notifications ---

    pub async fn notify(
        &self,
        input: NewNotification,
        now: DateTime<Utc>,
    ) -> Result<Notification, GuestPulseError> {
        let notification = self
            .notifications
            .update(move |items| notifications::append(items, input, now))
            .await?;
        debug!(id = %notification.id, kind = %notification.kind, "notification created");
        Ok(notification)
    }

    /// Notifications, newest first.
    pub async fn notifications(&self) -> Result<Vec<Notification>, GuestPulseError> {
        let mut items = self.notifications.load().await?;
        items.reverse();
        Ok(items)
    }

    pub async fn update_notification(
        &self,
        patch: NotificationPatch,
    ) -> Result<Notification, GuestPulseError> {
        self.notifications
            .update(move |items| notifications::apply_patch(items, patch))
            .await
    }

    // --- Guest submissions ---

    pub async fn submission_status(
        &self,
        ip: &str,
        now: DateTime<Utc>,
    ) -> Result<SubmissionStatus, GuestPulseError> {
        let items = self.submissions.load().await?;
        Ok(submissions::status(&items, ip, now, self.submission_window))
    }

    pub async fn record_submission(
        &self,
        ip: &str,
        now: DateTime<Utc>,
    ) -> Result<Submission, GuestPulseError> {
        let ip = ip.to_string();
        self.submissions
            .update(move |items| Ok(submissions::upsert(items, &ip, now)))
            .await
    }
}

#[async_trait]
impl PluginAdapter for Journal {
    fn name(&self) -> &str {
        "json-journal"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Journal
    }

    /// Healthy when the directory can be created and every existing file parses.
    async fn health_check(&self) -> Result<HealthStatus, GuestPulseError> {
        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            return Ok(HealthStatus::Unhealthy(format!(
                "cannot create {}: {e}",
                self.dir.display()
            )));
        }
        let marker = self.dir.join(".write-check");
        if let Err(e) = tokio::fs::write(&marker, b"ok").await {
            return Ok(HealthStatus::Unhealthy(format!(
                "{} is not writable: {e}",
                self.dir.display()
            )));
        }
        let _ = tokio::fs::remove_file(&marker).await;

        for (file, result) in [
            (AUDIT_FILE, self.audit.load().await.map(|_| ())),
            (NOTIFICATIONS_FILE, self.notifications.load().await.map(|_| ())),
            (SUBMISSIONS_FILE, self.submissions.load().await.map(|_| ())),
        ] {
            if let Err(e) = result {
                return Ok(HealthStatus::Degraded(format!("{file}: {e}")));
            }
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), GuestPulseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn blank_action_is_rejected() {
        let dir = tempdir().unwrap();
        let journal = Journal::new(dir.path(), Duration::hours(24));
        let err = journal.record(" ", "admin", "", t0()).await.unwrap_err();
        assert_eq!(err.to_string(), "Action is required");
        assert!(!dir.path().join(AUDIT_FILE).exists());
    }

    #[tokio::test]
    async fn audit_entries_are_newest_first() {
        let dir = tempdir().unwrap();
        let journal = Journal::new(dir.path(), Duration::hours(24));
        journal
            .record(crate::AuditAction::Login, "admin", "", t0())
            .await
            .unwrap();
        journal
            .record("CUSTOM", "admin", "hello", t0() + Duration::seconds(1))
            .await
            .unwrap();
        let entries = journal.audit_entries().await.unwrap();
        assert_eq!(entries[0].action, "CUSTOM");
        assert_eq!(entries[1].action, "LOGIN");
    }

    #[tokio::test]
    async fn health_check_reports_corrupt_file() {
        let dir = tempdir().unwrap();
        let journal = Journal::new(dir.path(), Duration::hours(24));
        assert_eq!(journal.health_check().await.unwrap(), HealthStatus::Healthy);

        std::fs::write(dir.path().join(NOTIFICATIONS_FILE), "[{").unwrap();
        assert!(matches!(
            journal.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));
    }
}
