// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as valid bind addresses, non-empty paths, and Argon2 parameter ranges.

use crate::diagnostic::ConfigError;
use crate::model::GuestPulseConfig;

/// Minimum HMAC key length accepted for `auth.cookie_secret`.
pub const MIN_COOKIE_SECRET_LEN: usize = 32;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &GuestPulseConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.server.host.trim();
    if host.is_empty() {
        fail("server.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "server.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    let base = config.server.public_base_url.trim();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        fail(format!(
            "server.public_base_url must start with http:// or https://, got `{base}`"
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.journal.data_dir.trim().is_empty() {
        fail("journal.data_dir must not be empty".to_string());
    }

    if let Some(secret) = &config.auth.cookie_secret
        && secret.len() < MIN_COOKIE_SECRET_LEN
    {
        fail(format!(
            "auth.cookie_secret must be at least {MIN_COOKIE_SECRET_LEN} bytes, got {}",
            secret.len()
        ));
    }

    if config.auth.session_ttl_hours == 0 {
        fail("auth.session_ttl_hours must be at least 1".to_string());
    }

    if config.auth.super_admin_access_code.trim().is_empty() {
        fail("auth.super_admin_access_code must not be empty".to_string());
    }

    // Argon2 rejects memory below 8 KiB per lane.
    if config.auth.password_memory_cost < 8 * config.auth.password_parallelism.max(1) {
        fail(format!(
            "auth.password_memory_cost must be at least 8 KiB per lane, got {}",
            config.auth.password_memory_cost
        ));
    }

    if config.auth.password_iterations < 1 {
        fail("auth.password_iterations must be at least 1".to_string());
    }

    if config.auth.password_parallelism < 1 {
        fail("auth.password_parallelism must be at least 1".to_string());
    }

    if config.feedback.submission_window_hours == 0 {
        fail("feedback.submission_window_hours must be at least 1".to_string());
    }

    let feedback = &config.feedback;
    if feedback.default_page_size == 0 || feedback.default_page_size > feedback.max_page_size {
        fail(format!(
            "feedback.default_page_size must be between 1 and max_page_size ({}), got {}",
            feedback.max_page_size, feedback.default_page_size
        ));
    }

    if feedback.min_session_minutes == 0 || feedback.min_session_minutes > feedback.max_session_minutes {
        fail(format!(
            "feedback.min_session_minutes must be between 1 and max_session_minutes ({}), got {}",
            feedback.max_session_minutes, feedback.min_session_minutes
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = GuestPulseConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn inverted_session_bounds_fail_validation() {
        let mut config = GuestPulseConfig::default();
        config.feedback.min_session_minutes = 600;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "min_session_minutes"));

        config.feedback.min_session_minutes = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "min_session_minutes"));
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = GuestPulseConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "database_path"));
    }

    #[test]
    fn short_cookie_secret_fails_validation() {
        let mut config = GuestPulseConfig::default();
        config.auth.cookie_secret = Some("too-short".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "cookie_secret"));
    }

    #[test]
    fn bad_base_url_fails_validation() {
        let mut config = GuestPulseConfig::default();
        config.server.public_base_url = "hotel.example".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "public_base_url"));
    }

    #[test]
    fn page_sizes_must_be_ordered() {
        let mut config = GuestPulseConfig::default();
        config.feedback.default_page_size = 500;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "default_page_size"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = GuestPulseConfig::default();
        config.server.host = "".to_string();
        config.storage.database_path = "".to_string();
        config.auth.session_ttl_hours = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = GuestPulseConfig::default();
        config.server.host = "0.0.0.0".to_string();
        config.server.public_base_url = "https://feedback.hotel.example".to_string();
        config.auth.cookie_secret = Some("x".repeat(48));
        assert!(validate_config(&config).is_ok());
    }
}
