// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::GuestPulseError;
use crate::types::{SEED_ADMIN_ID, SEED_SUPERADMIN_ID};

/// Operator tier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin,
    Superadmin,
}

/// An admin or superadmin account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    /// Argon2id PHC string. Never leaves the server.
    #[serde(skip)]
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
}

impl User {
    /// Seeded accounts cannot be deleted, deactivated or demoted.
    pub fn is_protected(&self) -> bool {
        is_protected_id(&self.id)
    }

    /// Reject a patch that would lock a seeded account out.
    pub fn check_patch(&self, patch: &UserPatch) -> Result<(), GuestPulseError> {
        if !self.is_protected() {
            return Ok(());
        }
        if patch.is_active == Some(false) {
            return Err(GuestPulseError::Forbidden(
                "Cannot deactivate default admin users".to_string(),
            ));
        }
        if patch.role.is_some_and(|role| role != self.role) {
            return Err(GuestPulseError::Forbidden(
                "Cannot change the role of default admin users".to_string(),
            ));
        }
        Ok(())
    }
}

/// True for the ids of the two seeded accounts.
pub fn is_protected_id(id: &str) -> bool {
    id == SEED_ADMIN_ID || id == SEED_SUPERADMIN_ID
}

/// Partial update for a user row. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub updated_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Check a username before it is stored.
pub fn validate_username(username: &str) -> Result<(), GuestPulseError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(GuestPulseError::Validation(
            "Username must not be empty".to_string(),
        ));
    }
    if trimmed.len() > 64 {
        return Err(GuestPulseError::Validation(
            "Username must be at most 64 characters".to_string(),
        ));
    }
    Ok(())
}

/// Check a plaintext password before hashing.
pub fn validate_password(password: &str) -> Result<(), GuestPulseError> {
    if password.is_empty() {
        return Err(GuestPulseError::Validation(
            "Password must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn role_round_trips_lowercase() {
        assert_eq!(Role::Superadmin.to_string(), "superadmin");
        assert_eq!(Role::from_str("admin").unwrap(), Role::Admin);
        assert!(Role::from_str("owner").is_err());
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }

    fn seeded(id: &str, role: Role) -> User {
        User {
            id: id.into(),
            username: "superadmin".into(),
            password_hash: String::new(),
            role,
            is_active: true,
            created_at: Utc::now(),
            created_by: None,
            last_login: None,
            updated_at: None,
            updated_by: None,
        }
    }

    #[test]
    fn seeded_accounts_cannot_be_locked_out() {
        let superadmin = seeded(SEED_SUPERADMIN_ID, Role::Superadmin);
        let deactivate = UserPatch {
            is_active: Some(false),
            ..UserPatch::default()
        };
        assert!(matches!(superadmin.check_patch(&deactivate), Err(GuestPulseError::Forbidden(_))));
        let demote = UserPatch {
            role: Some(Role::Admin),
            ..UserPatch::default()
        };
        assert!(matches!(superadmin.check_patch(&demote), Err(GuestPulseError::Forbidden(_))));

        let harmless = UserPatch {
            username: Some("owner".into()),
            role: Some(Role::Superadmin),
            is_active: Some(true),
            ..UserPatch::default()
        };
        assert!(superadmin.check_patch(&harmless).is_ok());

        let colleague = seeded("00000000-0000-0000-0000-000000000003", Role::Admin);
        assert!(colleague.check_patch(&deactivate).is_ok());
        assert!(colleague.check_patch(&demote).is_ok());
    }

    #[test]
    fn user_serialization_hides_password() {
        let user = User {
            id: "u-1".into(),
            username: "alice".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::Admin,
            is_active: true,
            created_at: Utc::now(),
            created_by: Some("system".into()),
            last_login: None,
            updated_at: None,
            updated_by: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"isActive\":true"));
        assert!(json.contains("\"lastLogin\":null"));
    }

    #[test]
    fn seeded_ids_are_protected() {
        assert!(is_protected_id(SEED_ADMIN_ID));
        assert!(is_protected_id(SEED_SUPERADMIN_ID));
        assert!(!is_protected_id("00000000-0000-0000-0000-000000000003"));
    }

    #[test]
    fn blank_username_rejected() {
        assert!(validate_username("   ").is_err());
        assert!(validate_username("bob").is_ok());
        assert!(validate_password("").is_err());
    }
}
