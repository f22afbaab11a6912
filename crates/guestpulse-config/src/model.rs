// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for GuestPulse.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level GuestPulse configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GuestPulseConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// JSON journal (audit, notifications, submissions) settings.
    #[serde(default)]
    pub journal: JournalConfig,

    /// Cookie authentication and password hashing settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Guest feedback collection settings.
    #[serde(default)]
    pub feedback: FeedbackConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Externally visible base URL, used to build voting links and QR codes.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            public_base_url: default_public_base_url(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:3000".to_string()
}

/// SQLite storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("guestpulse").join("guestpulse.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("guestpulse.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// JSON journal configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct JournalConfig {
    /// Directory holding the audit, notification and submission files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("guestpulse").join("data"))
        .unwrap_or_else(|| std::path::PathBuf::from("data"))
        .to_string_lossy()
        .into_owned()
}

/// Cookie authentication configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// HMAC key for signing auth cookies. When unset a random key is generated
    /// at startup and every restart logs all operators out.
    #[serde(default)]
    pub cookie_secret: Option<String>,

    /// Lifetime of auth cookies in hours.
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u32,

    /// Mark cookies `Secure` (requires HTTPS in front of the server).
    #[serde(default)]
    pub secure_cookies: bool,

    /// Access code checked by `/api/verify-access-code`.
    #[serde(default = "default_access_code")]
    pub super_admin_access_code: String,

    /// Argon2id memory cost in KiB.
    #[serde(default = "default_password_memory_cost")]
    pub password_memory_cost: u32,

    /// Argon2id iterations.
    #[serde(default = "default_password_iterations")]
    pub password_iterations: u32,

    /// Argon2id parallelism.
    #[serde(default = "default_password_parallelism")]
    pub password_parallelism: u32,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "cookie_secret",
                &self.cookie_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("session_ttl_hours", &self.session_ttl_hours)
            .field("secure_cookies", &self.secure_cookies)
            .field("super_admin_access_code", &"[redacted]")
            .field("password_memory_cost", &self.password_memory_cost)
            .field("password_iterations", &self.password_iterations)
            .field("password_parallelism", &self.password_parallelism)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_secret: None,
            session_ttl_hours: default_session_ttl_hours(),
            secure_cookies: false,
            super_admin_access_code: default_access_code(),
            password_memory_cost: default_password_memory_cost(),
            password_iterations: default_password_iterations(),
            password_parallelism: default_password_parallelism(),
        }
    }
}

fn default_session_ttl_hours() -> u32 {
    24
}

fn default_access_code() -> String {
    "VOTE2024".to_string()
}

/// OWASP minimum for Argon2id (19 MiB).
fn default_password_memory_cost() -> u32 {
    19456
}

fn default_password_iterations() -> u32 {
    2
}

fn default_password_parallelism() -> u32 {
    1
}

/// Guest feedback configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FeedbackConfig {
    /// A guest IP that submitted within this many hours counts as a recent submitter.
    #[serde(default = "default_submission_window_hours")]
    pub submission_window_hours: u32,

    /// Page size of `GET /api/reviews` when `limit` is omitted.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Upper bound for `limit`.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// Shortest voting session a superadmin may create, in minutes.
    #[serde(default = "default_min_session_minutes")]
    pub min_session_minutes: u32,

    /// Longest voting session a superadmin may create, in minutes.
    #[serde(default = "default_max_session_minutes")]
    pub max_session_minutes: u32,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            submission_window_hours: default_submission_window_hours(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            min_session_minutes: default_min_session_minutes(),
            max_session_minutes: default_max_session_minutes(),
        }
    }
}

fn default_submission_window_hours() -> u32 {
    24
}

fn default_page_size() -> u32 {
    10
}

fn default_max_page_size() -> u32 {
    100
}

fn default_min_session_minutes() -> u32 {
    5
}

fn default_max_session_minutes() -> u32 {
    480
}
