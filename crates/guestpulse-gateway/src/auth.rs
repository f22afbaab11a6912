// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cookie authentication middleware for the gateway.
//!
//! Two tiers are enforced from signed cookies only:
//! 1. Admin tier: a valid `superAdminToken` or `adminToken`
//! 2. Superadmin tier: a valid `superAdminToken` whose user is a superadmin
//!
//! The informational cookies (`adminAuth`, `adminRole`, ...) are written for
//! the browser and never grant access.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use guestpulse_core::{GuestPulseError, Role, User};
use serde::Serialize;

use crate::error::ApiError;
use crate::server::{AppState, GatewaySettings};

pub const ADMIN_TOKEN: &str = "adminToken";
pub const SUPER_ADMIN_TOKEN: &str = "superAdminToken";
pub const ADMIN_AUTH: &str = "adminAuth";
pub const ADMIN_ROLE: &str = "adminRole";
pub const ADMIN_USER: &str = "adminUser";
pub const SUPER_ADMIN_AUTH: &str = "superAdminAuth";
pub const SUPER_ADMIN_USER: &str = "superAdminUser";

/// Every cookie that logout clears.
pub const ALL_COOKIES: [&str; 7] = [
    ADMIN_AUTH,
    ADMIN_USER,
    ADMIN_ROLE,
    ADMIN_TOKEN,
    SUPER_ADMIN_AUTH,
    SUPER_ADMIN_USER,
    SUPER_ADMIN_TOKEN,
];

/// The authenticated operator, inserted as a request extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operator {
    pub id: String,
    pub username: String,
    pub role: Role,
}

impl From<&User> for Operator {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// A verified token's user id, taken from the strongest cookie present.
fn token_subject(state: &AppState, jar: &CookieJar, now: DateTime<Utc>) -> Option<(String, Role)> {
    let verify = |name: &str, tier: Role| {
        jar.get(name)
            .and_then(|c| state.signer.verify(c.value(), now))
            .filter(|claims| claims.tier == tier)
            .map(|claims| (claims.user_id, claims.tier))
    };
    verify(SUPER_ADMIN_TOKEN, Role::Superadmin).or_else(|| verify(ADMIN_TOKEN, Role::Admin))
}

/// Resolve the operator for the admin tier.
pub async fn authenticate_admin(
    state: &AppState,
    jar: &CookieJar,
) -> Result<Operator, GuestPulseError> {
    let now = state.clock.now();
    let Some((user_id, _)) = token_subject(state, jar, now) else {
        return Err(GuestPulseError::Unauthorized("Unauthorized".to_string()));
    };
    let user = state
        .storage
        .get_user(&user_id)
        .await?
        .ok_or_else(|| GuestPulseError::Unauthorized("Unauthorized".to_string()))?;
    if !user.is_active {
        return Err(GuestPulseError::Forbidden(
            "Account is deactivated".to_string(),
        ));
    }
    Ok(Operator::from(&user))
}

/// Resolve the operator for the superadmin tier.
pub async fn authenticate_superadmin(
    state: &AppState,
    jar: &CookieJar,
) -> Result<Operator, GuestPulseError> {
    let now = state.clock.now();
    let claims = jar
        .get(SUPER_ADMIN_TOKEN)
        .and_then(|c| state.signer.verify(c.value(), now))
        .filter(|claims| claims.tier == Role::Superadmin);

    let Some(claims) = claims else {
        // An admin cookie proves identity but not the tier.
        if token_subject(state, jar, now).is_some() {
            return Err(GuestPulseError::Forbidden(
                "Unauthorized - Super Admin access required".to_string(),
            ));
        }
        return Err(GuestPulseError::Unauthorized("Unauthorized".to_string()));
    };

    let user = state
        .storage
        .get_user(&claims.user_id)
        .await?
        .ok_or_else(|| GuestPulseError::Forbidden("User not found in database".to_string()))?;
    if user.role != Role::Superadmin {
        return Err(GuestPulseError::Forbidden(
            "Unauthorized - Super Admin access required".to_string(),
        ));
    }
    if !user.is_active {
        return Err(GuestPulseError::Forbidden(
            "Account is deactivated".to_string(),
        ));
    }
    Ok(Operator::from(&user))
}

/// Middleware for admin-tier routes.
pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate_admin(&state, &jar).await {
        Ok(operator) => {
            request.extensions_mut().insert(operator);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(path = %request.uri().path(), error = %e, "admin auth rejected");
            ApiError::from(e).into_response()
        }
    }
}

/// Middleware for superadmin-tier routes.
pub async fn require_superadmin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate_superadmin(&state, &jar).await {
        Ok(operator) => {
            request.extensions_mut().insert(operator);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(path = %request.uri().path(), error = %e, "superadmin auth rejected");
            ApiError::from(e).into_response()
        }
    }
}

fn base_cookie(
    name: &'static str,
    value: String,
    settings: &GatewaySettings,
    http_only: bool,
) -> Cookie<'static> {
    let max_age = time::Duration::seconds(settings.session_ttl.num_seconds());
    Cookie::build((name, value))
        .path("/")
        .http_only(http_only)
        .same_site(SameSite::Lax)
        .secure(settings.secure_cookies)
        .max_age(max_age)
        .build()
}

/// Add the login cookies for `user` to `jar`.
pub fn issue_login_cookies(state: &AppState, user: &User, jar: CookieJar) -> CookieJar {
    let settings = &state.settings;
    let expires_at = state.clock.now() + settings.session_ttl;

    let mut jar = jar
        .add(base_cookie(
            ADMIN_TOKEN,
            state.signer.issue(&user.id, Role::Admin, expires_at),
            settings,
            true,
        ))
        .add(base_cookie(ADMIN_AUTH, "true".into(), settings, true))
        .add(base_cookie(ADMIN_ROLE, user.role.to_string(), settings, true))
        .add(base_cookie(ADMIN_USER, user.username.clone(), settings, false));

    if user.role == Role::Superadmin {
        jar = jar
            .add(base_cookie(
                SUPER_ADMIN_TOKEN,
                state.signer.issue(&user.id, Role::Superadmin, expires_at),
                settings,
                true,
            ))
            .add(base_cookie(SUPER_ADMIN_AUTH, "true".into(), settings, true))
            .add(base_cookie(
                SUPER_ADMIN_USER,
                user.username.clone(),
                settings,
                true,
            ));
    }
    jar
}

/// Expire every auth cookie, whether or not the request carried it.
pub fn clear_cookies(jar: CookieJar) -> CookieJar {
    ALL_COOKIES.iter().fold(jar, |jar, name| {
        jar.add(
            Cookie::build((*name, ""))
                .path("/")
                .max_age(time::Duration::ZERO)
                .build(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn operator_from_user_drops_credentials() {
        let user = User {
            id: "u-1".into(),
            username: "frontdesk".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::Admin,
            is_active: true,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            created_by: None,
            last_login: None,
            updated_at: None,
            updated_by: None,
        };
        let operator = Operator::from(&user);
        assert_eq!(operator.username, "frontdesk");
        let json = serde_json::to_string(&operator).unwrap();
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn clear_cookies_expires_all_seven() {
        let jar = CookieJar::new().add(Cookie::new(ADMIN_TOKEN, "x"));
        let response = (clear_cookies(jar), ()).into_response();
        let headers: Vec<_> = response
            .headers()
            .get_all(axum::http::header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        for name in ALL_COOKIES {
            let header = headers
                .iter()
                .find(|h| h.starts_with(&format!("{name}=")))
                .unwrap_or_else(|| panic!("{name} not cleared"));
            assert!(header.contains("Max-Age=0"), "{header}");
        }
    }
}
