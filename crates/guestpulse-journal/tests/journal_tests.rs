// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the JSON journal.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use guestpulse_config::model::{FeedbackConfig, JournalConfig};
use guestpulse_core::{AdapterType, GuestPulseError, PluginAdapter};
use guestpulse_journal::{AuditAction, Journal, NewNotification, NotificationPatch};
use tempfile::tempdir;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 7, 14, 9, 30, 0).unwrap()
}

#[tokio::test]
async fn files_are_created_on_first_write_and_survive_reopen() {
    let dir = tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let journal = Journal::new(&data_dir, Duration::hours(24));

    journal
        .record(AuditAction::VotingSessionCreated, "superadmin", "Created \"Dinner\"", t0())
        .await
        .unwrap();
    assert!(data_dir.join("audit-logs-data.json").exists());
    assert!(!data_dir.join("notifications-data.json").exists());

    let reopened = Journal::new(&data_dir, Duration::hours(24));
    let entries = reopened.audit_entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "VOTING_SESSION_CREATED");
    assert_eq!(entries[0].id, format!("audit-{}", t0().timestamp_millis()));
    assert_eq!(entries[0].details, "Created \"Dinner\"");
}

#[tokio::test]
async fn notification_lifecycle() {
    let dir = tempdir().unwrap();
    let journal = Journal::new(dir.path(), Duration::hours(24));

    let created = journal
        .notify(
            NewNotification {
                kind: Some("session".into()),
                message: Some("Breakfast voting opened".into()),
            },
            t0(),
        )
        .await
        .unwrap();
    assert!(!created.read);

    let updated = journal
        .update_notification(NotificationPatch {
            id: Some(created.id.clone()),
            read: Some(true),
            ..NotificationPatch::default()
        })
        .await
        .unwrap();
    assert!(updated.read);

    let listed = journal.notifications().await.unwrap();
    assert_eq!(listed, vec![updated]);

    let missing = journal
        .update_notification(NotificationPatch {
            id: Some("notification-1".into()),
            ..NotificationPatch::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(missing, GuestPulseError::NotFound(_)));
}

#[tokio::test]
async fn submission_window_comes_from_config() {
    let dir = tempdir().unwrap();
    let journal = Journal::from_config(
        &JournalConfig {
            data_dir: dir.path().to_string_lossy().into_owned(),
        },
        &FeedbackConfig {
            submission_window_hours: 2,
            ..FeedbackConfig::default()
        },
    );

    let before = journal.submission_status("203.0.113.7", t0()).await.unwrap();
    assert!(!before.has_submitted_recently);

    journal.record_submission("203.0.113.7", t0()).await.unwrap();
    let soon = journal
        .submission_status("203.0.113.7", t0() + Duration::minutes(90))
        .await
        .unwrap();
    assert!(soon.has_submitted_recently);
    assert_eq!(soon.last_submission, Some(t0()));

    let later = journal
        .submission_status("203.0.113.7", t0() + Duration::hours(3))
        .await
        .unwrap();
    assert!(!later.has_submitted_recently);
}

#[tokio::test]
async fn concurrent_audit_writes_keep_every_entry() {
    let dir = tempdir().unwrap();
    let journal = Arc::new(Journal::new(dir.path(), Duration::hours(24)));

    let mut handles = Vec::new();
    for i in 0..16 {
        let journal = Arc::clone(&journal);
        handles.push(tokio::spawn(async move {
            journal
                .record(AuditAction::Login, format!("user-{i}"), "", t0())
                .await
                .unwrap()
        }));
    }
    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().id);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 16);
    assert_eq!(journal.audit_entries().await.unwrap().len(), 16);
}

#[tokio::test]
async fn reports_as_journal_adapter() {
    let dir = tempdir().unwrap();
    let journal = Journal::new(dir.path(), Duration::hours(24));
    assert_eq!(journal.adapter_type(), AdapterType::Journal);
    assert_eq!(journal.name(), "json-journal");
    journal.shutdown().await.unwrap();
}
