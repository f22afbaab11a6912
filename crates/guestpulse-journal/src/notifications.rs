// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notifications shown on the admin dashboards.

use chrono::{DateTime, Utc};
use guestpulse_core::GuestPulseError;
use serde::{Deserialize, Serialize};

use crate::unique_id;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

/// Body of a create request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewNotification {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of an update request. Present fields overwrite, absent ones are kept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationPatch {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub read: Option<bool>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub(crate) fn append(
    items: &mut Vec<Notification>,
    input: NewNotification,
    now: DateTime<Utc>,
) -> Result<Notification, GuestPulseError> {
    let (Some(kind), Some(message)) = (non_blank(input.kind), non_blank(input.message)) else {
        return Err(GuestPulseError::Validation(
            "Type and message are required".to_string(),
        ));
    };
    let id = unique_id("notification", now, |candidate| {
        items.iter().any(|n| n.id == candidate)
    });
    let notification = Notification {
        id,
        kind,
        message,
        timestamp: now,
        read: false,
    };
    items.push(notification.clone());
    Ok(notification)
}

pub(crate) fn apply_patch(
    items: &mut [Notification],
    patch: NotificationPatch,
) -> Result<Notification, GuestPulseError> {
    let Some(id) = non_blank(patch.id) else {
        return Err(GuestPulseError::Validation(
            "Notification ID is required".to_string(),
        ));
    };
    let target = items
        .iter_mut()
        .find(|n| n.id == id)
        .ok_or_else(|| GuestPulseError::NotFound("Notification not found".to_string()))?;

    if let Some(kind) = patch.kind {
        target.kind = kind;
    }
    if let Some(message) = patch.message {
        target.message = message;
    }
    if let Some(read) = patch.read {
        target.read = read;
    }
    Ok(target.clone())
}
