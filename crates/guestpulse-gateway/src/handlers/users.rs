// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator account management (superadmin only).

use std::str::FromStr;

use axum::{extract::State, http::StatusCode, Extension, Json};
use guestpulse_core::user::{is_protected_id, validate_password, validate_username};
use guestpulse_core::{GuestPulseError, Role, User, UserPatch};
use guestpulse_journal::AuditAction;
use guestpulse_vault::PasswordParams;
use serde::Deserialize;
use tracing::info;

use crate::auth::Operator;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::handlers::auth::check_password;
use crate::handlers::sessions::{audit, IdQuery};
use crate::handlers::{new_id, Success};
use crate::server::AppState;

fn user_not_found() -> GuestPulseError {
    GuestPulseError::NotFound("User not found".to_string())
}

/// Hash a password off the async runtime.
pub(crate) async fn hash(password: String, params: PasswordParams) -> Result<String, GuestPulseError> {
    tokio::task::spawn_blocking(move || guestpulse_vault::hash_password(&password, &params))
        .await
        .map_err(|e| GuestPulseError::Internal(format!("password hashing panicked: {e}")))?
}

fn parse_role(raw: &str) -> Result<Role, GuestPulseError> {
    Role::from_str(raw).map_err(|_| GuestPulseError::Validation(format!("Invalid role: {raw}")))
}

fn required(field: &'static str, value: Option<String>) -> Result<String, GuestPulseError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| GuestPulseError::Validation(format!("Missing required field: {field}")))
}

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    let users = state
        .storage
        .list_users()
        .await
        .map_err(|e| ApiError::from(e).server_message("Failed to fetch users"))?;
    Ok(Json(users))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    Extension(operator): Extension<Operator>,
    ApiJson(body): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let username = required("username", body.username)?.trim().to_string();
    let password = required("password", body.password)?;
    let role = parse_role(&required("role", body.role)?)?;
    validate_username(&username)?;
    validate_password(&password)?;

    if state.storage.get_user_by_username(&username).await?.is_some() {
        return Err(GuestPulseError::Validation("Username already exists".to_string()).into());
    }

    let user = User {
        id: new_id(),
        username,
        password_hash: hash(password, state.settings.password_params).await?,
        role,
        is_active: body.is_active.unwrap_or(true),
        created_at: state.clock.now(),
        created_by: Some(operator.id.clone()),
        last_login: None,
        updated_at: None,
        updated_by: None,
    };
    state
        .storage
        .create_user(&user)
        .await
        .map_err(|e| ApiError::from(e).server_message("Failed to create user"))?;
    info!(username = %user.username, role = %user.role, "operator account created");
    audit(
        &state,
        AuditAction::UserCreated,
        &operator.username,
        format!("Created user \"{}\" with role {}", user.username, user.role),
    )
    .await;
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// PUT /api/users?id=
pub async fn update_user(
    State(state): State<AppState>,
    Extension(operator): Extension<Operator>,
    ApiQuery(query): ApiQuery<IdQuery>,
    ApiJson(body): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    let Some(id) = query.id.filter(|id| !id.is_empty()) else {
        return Err(GuestPulseError::Validation("User ID is required".to_string()).into());
    };
    let existing = state
        .storage
        .get_user(&id)
        .await?
        .ok_or_else(user_not_found)?;

    let username = body
        .username
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty() && *u != existing.username);
    if let Some(name) = &username {
        validate_username(name)?;
        if state.storage.get_user_by_username(name).await?.is_some() {
            return Err(GuestPulseError::Validation("Username already exists".to_string()).into());
        }
    }
    let password_hash = match body.password.filter(|p| !p.is_empty()) {
        Some(password) => Some(hash(password, state.settings.password_params).await?),
        None => None,
    };
    let role = body
        .role
        .filter(|r| !r.is_empty())
        .map(|r| parse_role(&r))
        .transpose()?;

    let patch = UserPatch {
        username,
        password_hash,
        role,
        is_active: body.is_active,
        updated_by: Some(operator.id.clone()),
        updated_at: Some(state.clock.now()),
    };
    existing.check_patch(&patch)?;
    let updated = state
        .storage
        .update_user(&id, &patch)
        .await
        .map_err(|e| ApiError::from(e).server_message("Failed to update user"))?
        .ok_or_else(user_not_found)?;
    info!(username = %updated.username, "operator account updated");
    audit(
        &state,
        AuditAction::UserUpdated,
        &operator.username,
        format!("Updated user \"{}\"", updated.username),
    )
    .await;
    Ok(Json(updated))
}

/// DELETE /api/users?id=
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(operator): Extension<Operator>,
    ApiQuery(query): ApiQuery<IdQuery>,
) -> ApiResult<Json<Success>> {
    let Some(id) = query.id.filter(|id| !id.is_empty()) else {
        return Err(GuestPulseError::Validation("User ID is required".to_string()).into());
    };
    if is_protected_id(&id) {
        return Err(
            GuestPulseError::Forbidden("Cannot delete default admin users".to_string()).into(),
        );
    }
    let user = state
        .storage
        .get_user(&id)
        .await?
        .ok_or_else(user_not_found)?;
    if !state
        .storage
        .delete_user(&id)
        .await
        .map_err(|e| ApiError::from(e).server_message("Failed to delete user"))?
    {
        return Err(user_not_found().into());
    }
    info!(username = %user.username, "operator account deleted");
    audit(
        &state,
        AuditAction::UserDeleted,
        &operator.username,
        format!("Deleted user \"{}\"", user.username),
    )
    .await;
    Ok(Success::ok())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub current_password: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

/// POST /api/users/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(operator): Extension<Operator>,
    ApiJson(body): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Json<Success>> {
    let (Some(username), Some(current), Some(new)) = (
        body.username.filter(|v| !v.is_empty()),
        body.current_password.filter(|v| !v.is_empty()),
        body.new_password.filter(|v| !v.is_empty()),
    ) else {
        return Err(GuestPulseError::Validation(
            "Username, current password, and new password are required".to_string(),
        )
        .into());
    };
    validate_password(&new)?;

    let user = state
        .storage
        .get_user_by_username(&username)
        .await?
        .ok_or_else(user_not_found)?;
    if !check_password(current, user.password_hash.clone()).await? {
        return Err(
            GuestPulseError::Unauthorized("Current password is incorrect".to_string()).into(),
        );
    }

    let patch = UserPatch {
        password_hash: Some(hash(new, state.settings.password_params).await?),
        updated_by: Some(operator.id.clone()),
        updated_at: Some(state.clock.now()),
        ..UserPatch::default()
    };
    state
        .storage
        .update_user(&user.id, &patch)
        .await
        .map_err(|e| ApiError::from(e).server_message("Failed to change password"))?
        .ok_or_else(user_not_found)?;
    info!(username = %user.username, "password changed");
    audit(
        &state,
        AuditAction::PasswordChanged,
        &operator.username,
        format!("Changed password for \"{}\"", user.username),
    )
    .await;
    Ok(Success::ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_fields_name_the_missing_one() {
        let err = required("role", Some("  ".into())).unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: role");
        assert_eq!(required("role", Some("admin".into())).unwrap(), "admin");
    }

    #[test]
    fn roles_parse_lowercase_only() {
        assert_eq!(parse_role("superadmin").unwrap(), Role::Superadmin);
        assert!(parse_role("owner").is_err());
    }
}
