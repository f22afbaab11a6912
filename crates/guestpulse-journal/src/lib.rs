// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only JSON-file logs for GuestPulse.
//!
//! Three flat files live under the configured data directory:
//!
//! - `audit-logs-data.json`: one entry per privileged action
//! - `notifications-data.json`: cross-role notifications with a `read` flag
//! - `user-submissions-data.json`: last review submission per guest IP
//!
//! Each file is guarded by its own async mutex and rewritten atomically
//! (temp file + rename), so concurrent handlers never interleave writes.

pub mod audit;
pub mod journal;
pub mod notifications;
pub mod store;
pub mod submissions;

pub use audit::{AuditAction, AuditEntry};
pub use journal::Journal;
pub use notifications::{NewNotification, Notification, NotificationPatch};
pub use store::JsonFileStore;
pub use submissions::{Submission, SubmissionStatus};

use chrono::{DateTime, Utc};

/// `<prefix>-<unix millis>`, with `-1`, `-2`, ... appended on collision.
pub(crate) fn unique_id(prefix: &str, now: DateTime<Utc>, taken: impl Fn(&str) -> bool) -> String {
    let base = format!("{prefix}-{}", now.timestamp_millis());
    if !taken(&base) {
        return base;
    }
    (1u32..)
        .map(|k| format!("{base}-{k}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or(base)
}
