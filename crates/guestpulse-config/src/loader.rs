// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./guestpulse.toml` > `~/.config/guestpulse/guestpulse.toml`
//! > `/etc/guestpulse/guestpulse.toml` with environment variable overrides via the
//! `GUESTPULSE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::GuestPulseConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/guestpulse/guestpulse.toml` (system-wide)
/// 3. `~/.config/guestpulse/guestpulse.toml` (user XDG config)
/// 4. `./guestpulse.toml` (local directory)
/// 5. `GUESTPULSE_*` environment variables
pub fn load_config() -> Result<GuestPulseConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<GuestPulseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GuestPulseConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<GuestPulseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GuestPulseConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(GuestPulseConfig::default()))
        .merge(Toml::file("/etc/guestpulse/guestpulse.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("guestpulse/guestpulse.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("guestpulse.toml"))
        .merge(env_provider())
}

/// Top-level tables of `guestpulse.toml`, in file order.
pub const SECTIONS: [&str; 5] = ["server", "storage", "journal", "auth", "feedback"];

/// Map an env var name (prefix stripped, lowercased) to a dotted config key.
///
/// Uses explicit section prefixes rather than `split("_")`, because key names
/// contain underscores: `GUESTPULSE_AUTH_COOKIE_SECRET` must become
/// `auth.cookie_secret`, not `auth.cookie.secret`.
pub fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

/// Env var that overrides a dotted config key: `auth.cookie_secret` is
/// `GUESTPULSE_AUTH_COOKIE_SECRET`.
pub fn env_var_for(key: &str) -> String {
    format!("GUESTPULSE_{}", key.replace('.', "_").to_ascii_uppercase())
}

fn env_provider() -> Env {
    Env::prefixed("GUESTPULSE_").map(|key| map_env_key(key.as_str()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("auth_cookie_secret"), "auth.cookie_secret");
        assert_eq!(map_env_key("server_public_base_url"), "server.public_base_url");
        assert_eq!(map_env_key("storage_database_path"), "storage.database_path");
        assert_eq!(
            map_env_key("feedback_submission_window_hours"),
            "feedback.submission_window_hours"
        );
        assert_eq!(map_env_key("unrelated"), "unrelated");
    }

    #[test]
    fn env_var_names_invert_the_mapping() {
        for key in ["auth.cookie_secret", "server.port", "feedback.max_page_size"] {
            let var = env_var_for(key);
            let stripped = var.trim_start_matches("GUESTPULSE_").to_ascii_lowercase();
            assert_eq!(map_env_key(&stripped), key);
        }
    }
}
