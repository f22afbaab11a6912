// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `guestpulse user` command implementation.
//!
//! Account management straight against the database, for bootstrapping and
//! for recovering a locked-out superadmin. Every change lands in the audit
//! log attributed to `cli`.

use std::str::FromStr;
use std::sync::Arc;

use guestpulse_config::GuestPulseConfig;
use guestpulse_core::user::{validate_password, validate_username};
use guestpulse_core::{Clock, GuestPulseError, Role, StorageAdapter, SystemClock, User, UserPatch};
use guestpulse_journal::{AuditAction, Journal};
use guestpulse_storage::SqliteStorage;
use guestpulse_vault::{hash_password, PasswordParams};
use tracing::warn;

use crate::serve::open_storage;

const CLI_ACTOR: &str = "cli";

struct Accounts {
    storage: Arc<SqliteStorage>,
    journal: Journal,
    params: PasswordParams,
}

impl Accounts {
    async fn open(config: &GuestPulseConfig) -> Result<Self, GuestPulseError> {
        Ok(Self {
            storage: open_storage(config).await?,
            journal: Journal::from_config(&config.journal, &config.feedback),
            params: PasswordParams::from(&config.auth),
        })
    }

    async fn close(self) -> Result<(), GuestPulseError> {
        self.storage.close().await
    }

    async fn audit(&self, action: AuditAction, details: String) {
        if let Err(e) = self
            .journal
            .record(action, CLI_ACTOR, details, SystemClock.now())
            .await
        {
            warn!(action = %action, error = %e, "failed to record audit entry");
        }
    }

    async fn hash(&self, password: String) -> Result<String, GuestPulseError> {
        validate_password(&password)?;
        let params = self.params;
        tokio::task::spawn_blocking(move || hash_password(&password, &params))
            .await
            .map_err(|e| GuestPulseError::Internal(format!("password hashing panicked: {e}")))?
    }

    async fn find(&self, username: &str) -> Result<User, GuestPulseError> {
        self.storage
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| GuestPulseError::NotFound(format!("no account named {username}")))
    }

    async fn create(
        &self,
        username: &str,
        role: &str,
        password: String,
    ) -> Result<User, GuestPulseError> {
        let username = username.trim();
        validate_username(username)?;
        let role = Role::from_str(role)
            .map_err(|_| GuestPulseError::Validation(format!("Invalid role: {role}")))?;

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: self.hash(password).await?,
            role,
            is_active: true,
            created_at: SystemClock.now(),
            created_by: Some(CLI_ACTOR.to_string()),
            last_login: None,
            updated_at: None,
            updated_by: None,
        };
        self.storage.create_user(&user).await?;
        self.audit(
            AuditAction::UserCreated,
            format!("Created user \"{}\" with role {}", user.username, user.role),
        )
        .await;
        Ok(user)
    }

    async fn patch(&self, username: &str, patch: UserPatch) -> Result<User, GuestPulseError> {
        let user = self.find(username).await?;
        let patch = UserPatch {
            updated_by: Some(CLI_ACTOR.to_string()),
            updated_at: Some(SystemClock.now()),
            ..patch
        };
        user.check_patch(&patch)?;
        self.storage
            .update_user(&user.id, &patch)
            .await?
            .ok_or_else(|| GuestPulseError::NotFound(format!("no account named {username}")))
    }

    async fn reset_password(&self, username: &str, password: String) -> Result<User, GuestPulseError> {
        let hash = self.hash(password).await?;
        let user = self
            .patch(
                username,
                UserPatch {
                    password_hash: Some(hash),
                    ..UserPatch::default()
                },
            )
            .await?;
        self.audit(
            AuditAction::PasswordChanged,
            format!("Password reset for user \"{}\"", user.username),
        )
        .await;
        Ok(user)
    }

    async fn set_active(&self, username: &str, active: bool) -> Result<User, GuestPulseError> {
        let user = self
            .patch(
                username,
                UserPatch {
                    is_active: Some(active),
                    ..UserPatch::default()
                },
            )
            .await?;
        let verb = if active { "Activated" } else { "Deactivated" };
        self.audit(
            AuditAction::UserUpdated,
            format!("{verb} user \"{}\"", user.username),
        )
        .await;
        Ok(user)
    }
}

fn password_or_prompt(password: Option<String>) -> Result<String, GuestPulseError> {
    match password {
        Some(password) => Ok(password),
        None => rpassword::prompt_password("Password: ")
            .map_err(|e| GuestPulseError::Internal(format!("failed to read password: {e}"))),
    }
}

fn describe(user: &User) -> String {
    let last_login = user
        .last_login
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "never".to_string());
    let state = if user.is_active { "active" } else { "inactive" };
    format!(
        "{:<24} {:<11} {:<9} {last_login}",
        user.username,
        user.role.to_string(),
        state
    )
}

/// `guestpulse user list`
pub async fn run_list(config: &GuestPulseConfig) -> Result<(), GuestPulseError> {
    let accounts = Accounts::open(config).await?;
    let users = accounts.storage.list_users().await?;
    println!("{:<24} {:<11} {:<9} LAST LOGIN", "USERNAME", "ROLE", "STATE");
    for user in &users {
        println!("{}", describe(user));
    }
    accounts.close().await
}

/// `guestpulse user create`
pub async fn run_create(
    config: &GuestPulseConfig,
    username: &str,
    role: &str,
    password: Option<String>,
) -> Result<(), GuestPulseError> {
    let password = password_or_prompt(password)?;
    let accounts = Accounts::open(config).await?;
    let user = accounts.create(username, role, password).await?;
    println!("created {} ({})", user.username, user.role);
    accounts.close().await
}

/// `guestpulse user reset-password`
pub async fn run_reset_password(
    config: &GuestPulseConfig,
    username: &str,
    password: Option<String>,
) -> Result<(), GuestPulseError> {
    let password = password_or_prompt(password)?;
    let accounts = Accounts::open(config).await?;
    let user = accounts.reset_password(username, password).await?;
    println!("password updated for {}", user.username);
    accounts.close().await
}

/// `guestpulse user activate` and `guestpulse user deactivate`
pub async fn run_set_active(
    config: &GuestPulseConfig,
    username: &str,
    active: bool,
) -> Result<(), GuestPulseError> {
    let accounts = Accounts::open(config).await?;
    let user = accounts.set_active(username, active).await?;
    let state = if user.is_active { "active" } else { "inactive" };
    println!("{} is now {state}", user.username);
    accounts.close().await
}
