// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Login, logout, access-code check and operator info.

use axum::{extract::State, Extension, Json};
use axum_extra::extract::cookie::CookieJar;
use guestpulse_core::{GuestPulseError, Role, User};
use guestpulse_journal::AuditAction;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{authenticate_admin, clear_cookies, issue_login_cookies, Operator};
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::handlers::Success;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: LoginUser,
    pub role: Role,
}

/// Check a password against a stored hash off the async runtime.
pub(crate) async fn check_password(password: String, hash: String) -> Result<bool, GuestPulseError> {
    tokio::task::spawn_blocking(move || guestpulse_vault::verify_password(&password, &hash))
        .await
        .map_err(|e| GuestPulseError::Internal(format!("password check panicked: {e}")))?
}

/// POST /api/auth
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<(CookieJar, Json<LoginResponse>)> {
    let (Some(username), Some(password)) = (
        body.username.filter(|u| !u.is_empty()),
        body.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(GuestPulseError::Validation(
            "Username and password are required".to_string(),
        )
        .into());
    };

    let invalid = || GuestPulseError::Unauthorized("Invalid credentials".to_string());
    let user: User = state
        .storage
        .get_user_by_username(&username)
        .await
        .map_err(|e| ApiError::from(e).server_message("An error occurred during authentication"))?
        .ok_or_else(invalid)?;

    if !user.is_active {
        info!(username = %user.username, "login refused for deactivated account");
        return Err(GuestPulseError::Forbidden("Account is deactivated".to_string()).into());
    }
    if !check_password(password, user.password_hash.clone()).await? {
        info!(username = %user.username, "login failed");
        return Err(invalid().into());
    }

    let now = state.clock.now();
    state.storage.record_login(&user.id, now).await?;
    if let Err(e) = state
        .journal
        .record(AuditAction::Login, &user.username, "Signed in", now)
        .await
    {
        warn!(error = %e, "failed to record login audit entry");
    }
    info!(username = %user.username, role = %user.role, "operator signed in");

    let jar = issue_login_cookies(&state, &user, jar);
    let response = LoginResponse {
        user: LoginUser {
            id: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
            name: user.username.clone(),
        },
        role: user.role,
    };
    Ok((jar, Json(response)))
}

/// POST /api/logout
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Success>) {
    if let Ok(operator) = authenticate_admin(&state, &jar).await
        && let Err(e) = state
            .journal
            .record(AuditAction::Logout, &operator.username, "Signed out", state.clock.now())
            .await
    {
        warn!(error = %e, "failed to record logout audit entry");
    }
    (clear_cookies(jar), Success::ok())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessCodeRequest {
    #[serde(default)]
    pub access_code: Option<String>,
}

/// POST /api/verify-access-code
pub async fn verify_access_code(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AccessCodeRequest>,
) -> ApiResult<Json<Success>> {
    let Some(code) = body.access_code.filter(|c| !c.is_empty()) else {
        return Err(GuestPulseError::Validation("Access code is required".to_string()).into());
    };
    if code != state.settings.access_code {
        return Err(GuestPulseError::Unauthorized("Invalid access code".to_string()).into());
    }
    Ok(Success::ok())
}

/// GET /api/user-info
pub async fn user_info(
    State(state): State<AppState>,
    Extension(operator): Extension<Operator>,
) -> ApiResult<Json<User>> {
    let user = state
        .storage
        .get_user(&operator.id)
        .await?
        .ok_or_else(|| GuestPulseError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}
