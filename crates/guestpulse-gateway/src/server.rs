// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP server built on axum.
//!
//! Sets up routes, auth middleware, and shared state.

use std::future::Future;
use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use chrono::Duration;
use tower_http::trace::TraceLayer;

use guestpulse_config::model::{GuestPulseConfig, ServerConfig};
use guestpulse_core::{Clock, DurationLimits, GuestPulseError, StorageAdapter};
use guestpulse_journal::Journal;
use guestpulse_vault::{CookieSigner, PasswordParams};

use crate::auth::{require_admin, require_superadmin};
use crate::handlers;

/// Request-independent settings derived from the configuration.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Base of the public voting links, without a trailing slash.
    pub public_base_url: String,
    pub session_ttl: Duration,
    pub secure_cookies: bool,
    pub access_code: String,
    pub password_params: PasswordParams,
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub session_limits: DurationLimits,
}

impl GatewaySettings {
    pub fn from_config(config: &GuestPulseConfig) -> Self {
        Self {
            public_base_url: config.server.public_base_url.trim_end_matches('/').to_string(),
            session_ttl: Duration::hours(i64::from(config.auth.session_ttl_hours)),
            secure_cookies: config.auth.secure_cookies,
            access_code: config.auth.super_admin_access_code.clone(),
            password_params: PasswordParams::from(&config.auth),
            default_page_size: config.feedback.default_page_size,
            max_page_size: config.feedback.max_page_size,
            session_limits: DurationLimits {
                min: config.feedback.min_session_minutes,
                max: config.feedback.max_session_minutes,
            },
        }
    }

    /// `<base>/vote/<slug>`, the link guests open.
    pub fn voting_url(&self, slug: &str) -> String {
        format!("{}/vote/{slug}", self.public_base_url)
    }

    /// Where the SVG QR code for a session is served.
    pub fn qr_code_url(&self, slug: &str) -> String {
        format!("{}/api/voting-sessions/slug/{slug}/qr", self.public_base_url)
    }
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn StorageAdapter>,
    pub journal: Arc<Journal>,
    pub signer: CookieSigner,
    pub clock: Arc<dyn Clock>,
    pub settings: Arc<GatewaySettings>,
}

/// Assemble every route.
///
/// - public: health, login/logout, access code, slug links, votes, review
///   submission, guest submission throttle
/// - admin tier: reads of reviews, analytics, sessions, votes, audit log,
///   notifications, user info
/// - superadmin tier: session mutations and user management
pub fn build_router(state: AppState) -> Router {
    let admin = axum_middleware::from_fn_with_state(state.clone(), require_admin);
    let superadmin = axum_middleware::from_fn_with_state(state.clone(), require_superadmin);

    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/api/auth", post(handlers::auth::login))
        .route("/api/logout", post(handlers::auth::logout))
        .route(
            "/api/verify-access-code",
            post(handlers::auth::verify_access_code),
        )
        .route(
            "/api/voting-sessions/slug/{slug}",
            get(handlers::links::get_session_by_slug),
        )
        .route(
            "/api/voting-sessions/slug/{slug}/qr",
            get(handlers::links::get_session_qr),
        )
        .route(
            "/api/verify-vote-link/{slug}",
            get(handlers::links::verify_vote_link),
        )
        .route("/api/votes/{slug}", post(handlers::votes::cast_vote))
        .route(
            "/api/user-submissions",
            get(handlers::journal::get_submission_status)
                .post(handlers::journal::record_submission),
        );

    let admin_routes = Router::new()
        .route("/api/reviews/export", get(handlers::reviews::export_reviews))
        .route("/api/analytics", get(handlers::analytics::get_analytics))
        .route(
            "/api/voting-sessions/{id}/votes",
            get(handlers::votes::list_votes),
        )
        .route(
            "/api/audit-logs",
            get(handlers::journal::list_audit_logs).post(handlers::journal::create_audit_log),
        )
        .route(
            "/api/notifications",
            get(handlers::journal::list_notifications)
                .post(handlers::journal::create_notification)
                .patch(handlers::journal::update_notification),
        )
        .route("/api/user-info", get(handlers::auth::user_info))
        .route_layer(admin.clone());

    let superadmin_routes = Router::new()
        .route(
            "/api/users",
            get(handlers::users::list_users)
                .post(handlers::users::create_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route(
            "/api/users/change-password",
            post(handlers::users::change_password),
        )
        .route_layer(superadmin.clone());

    // Paths whose methods sit in different tiers.
    let mixed_routes = Router::new()
        .route(
            "/api/reviews",
            post(handlers::reviews::create_review)
                .merge(get(handlers::reviews::list_reviews).route_layer(admin.clone())),
        )
        .route(
            "/api/voting-sessions",
            get(handlers::sessions::list_sessions)
                .route_layer(admin)
                .merge(
                    post(handlers::sessions::create_session)
                        .patch(handlers::sessions::update_session)
                        .delete(handlers::sessions::delete_session)
                        .route_layer(superadmin),
                ),
        );

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .merge(superadmin_routes)
        .merge(mixed_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until `shutdown` resolves.
pub async fn start_server(
    config: &ServerConfig,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), GuestPulseError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| GuestPulseError::Internal(format!("failed to bind {addr}: {e}")))?;

    tracing::info!("GuestPulse listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| GuestPulseError::Internal(format!("server error: {e}")))?;

    tracing::info!("server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_trim_base_url_and_build_links() {
        let mut config = GuestPulseConfig::default();
        config.server.public_base_url = "https://feedback.example.com/".into();
        config.auth.session_ttl_hours = 12;

        let settings = GatewaySettings::from_config(&config);
        assert_eq!(settings.session_ttl, Duration::hours(12));
        assert_eq!(
            settings.voting_url("abc"),
            "https://feedback.example.com/vote/abc"
        );
        assert_eq!(
            settings.qr_code_url("abc"),
            "https://feedback.example.com/api/voting-sessions/slug/abc/qr"
        );
    }

    #[test]
    fn settings_carry_page_sizes() {
        let settings = GatewaySettings::from_config(&GuestPulseConfig::default());
        assert_eq!(settings.default_page_size, 10);
        assert_eq!(settings.max_page_size, 100);
    }
}
