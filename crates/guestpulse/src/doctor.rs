// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `guestpulse doctor` command implementation.
//!
//! Runs diagnostic checks against the configuration, the database and the
//! journal directory, and prints a PASS/WARN/FAIL table.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use guestpulse_config::model::AuthConfig;
use guestpulse_config::GuestPulseConfig;
use guestpulse_core::types::{SEED_ADMIN_ID, SEED_SUPERADMIN_ID};
use guestpulse_core::{GuestPulseError, HealthStatus, PluginAdapter};
use guestpulse_journal::Journal;
use guestpulse_storage::migrations::embedded_migration_names;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `guestpulse doctor` command. With `--plain`, disables colored output.
pub async fn run_doctor(config: &GuestPulseConfig, plain: bool) -> Result<(), GuestPulseError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let db_path = &config.storage.database_path;

    let results = vec![
        check_config(config),
        check_database(db_path).await,
        check_migrations(db_path).await,
        check_seed_accounts(db_path).await,
        check_journal(config).await,
    ];

    println!();
    println!("  guestpulse doctor");
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    let mut warn_count = 0;
    for result in &results {
        match result.status {
            CheckStatus::Pass => {}
            CheckStatus::Warn => warn_count += 1,
            CheckStatus::Fail => fail_count += 1,
        }
        println!("{}", render_line(result, use_color));
    }

    println!();
    if fail_count > 0 || warn_count > 0 {
        let issues = fail_count + warn_count;
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(())
}

fn render_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green().to_string(), result.message.normal().to_string()),
            CheckStatus::Warn => ("!".yellow().to_string(), result.message.yellow().to_string()),
            CheckStatus::Fail => ("✗".red().to_string(), result.message.red().to_string()),
        };
        format!("    {symbol} {:<20} {message} ({duration_ms}ms)", result.name)
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[PASS]",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        )
    }
}

/// The config already validated; flag settings that are legal but risky.
fn check_config(config: &GuestPulseConfig) -> CheckResult {
    let start = Instant::now();
    let mut concerns = Vec::new();
    if config.auth.cookie_secret.is_none() {
        concerns.push("auth.cookie_secret unset (logins reset on restart)");
    }
    if config.auth.super_admin_access_code == AuthConfig::default().super_admin_access_code {
        concerns.push("default access code in use");
    }
    if config.server.public_base_url.starts_with("https://") && !config.auth.secure_cookies {
        concerns.push("https base URL without auth.secure_cookies");
    }

    if concerns.is_empty() {
        CheckResult::new("Configuration", CheckStatus::Pass, "valid", start)
    } else {
        CheckResult::new("Configuration", CheckStatus::Warn, concerns.join("; "), start)
    }
}

async fn open_existing(db_path: &str) -> Result<Option<tokio_rusqlite::Connection>, String> {
    if !std::path::Path::new(db_path).exists() {
        return Ok(None);
    }
    tokio_rusqlite::Connection::open(db_path)
        .await
        .map(Some)
        .map_err(|e| format!("open failed: {e}"))
}

/// Check the database file exists and answers a query.
async fn check_database(db_path: &str) -> CheckResult {
    let start = Instant::now();
    let conn = match open_existing(db_path).await {
        Ok(Some(conn)) => conn,
        Ok(None) => {
            return CheckResult::new(
                "Database",
                CheckStatus::Warn,
                format!("not found: {db_path} (will be created on first run)"),
                start,
            );
        }
        Err(message) => return CheckResult::new("Database", CheckStatus::Fail, message, start),
    };

    let integrity: Result<String, tokio_rusqlite::Error<rusqlite::Error>> = conn
        .call(|conn| conn.query_row("PRAGMA integrity_check", [], |row| row.get(0)))
        .await;
    match integrity {
        Ok(verdict) if verdict == "ok" => {
            CheckResult::new("Database", CheckStatus::Pass, "connected, integrity ok", start)
        }
        Ok(verdict) => CheckResult::new(
            "Database",
            CheckStatus::Fail,
            format!("integrity check: {verdict}"),
            start,
        ),
        Err(e) => CheckResult::new(
            "Database",
            CheckStatus::Fail,
            format!("query failed: {e}"),
            start,
        ),
    }
}

/// Compare applied migrations with the ones compiled into this binary.
async fn check_migrations(db_path: &str) -> CheckResult {
    let start = Instant::now();
    let embedded = embedded_migration_names().len();
    let conn = match open_existing(db_path).await {
        Ok(Some(conn)) => conn,
        Ok(None) => {
            return CheckResult::new(
                "Migrations",
                CheckStatus::Warn,
                format!("{embedded} pending (no database yet)"),
                start,
            );
        }
        Err(message) => return CheckResult::new("Migrations", CheckStatus::Fail, message, start),
    };

    let applied: Result<i64, tokio_rusqlite::Error<rusqlite::Error>> = conn
        .call(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'table' AND name = 'refinery_schema_history'",
                [],
                |row| row.get::<_, i64>(0),
            )
            .and_then(|exists| {
                if exists == 0 {
                    Ok(0)
                } else {
                    conn.query_row("SELECT COUNT(*) FROM refinery_schema_history", [], |row| {
                        row.get(0)
                    })
                }
            })
        })
        .await;

    match applied {
        Ok(applied) if applied as usize == embedded => CheckResult::new(
            "Migrations",
            CheckStatus::Pass,
            format!("{applied} applied"),
            start,
        ),
        Ok(applied) if (applied as usize) < embedded => CheckResult::new(
            "Migrations",
            CheckStatus::Warn,
            format!(
                "{} pending (applied on next start)",
                embedded - applied as usize
            ),
            start,
        ),
        Ok(applied) => CheckResult::new(
            "Migrations",
            CheckStatus::Fail,
            format!("database has {applied} migrations, this build knows {embedded}"),
            start,
        ),
        Err(e) => CheckResult::new(
            "Migrations",
            CheckStatus::Fail,
            format!("query failed: {e}"),
            start,
        ),
    }
}

/// The two seeded accounts must exist and be active.
async fn check_seed_accounts(db_path: &str) -> CheckResult {
    let start = Instant::now();
    let conn = match open_existing(db_path).await {
        Ok(Some(conn)) => conn,
        Ok(None) => {
            return CheckResult::new(
                "Default accounts",
                CheckStatus::Warn,
                "seeded on first run",
                start,
            );
        }
        Err(message) => {
            return CheckResult::new("Default accounts", CheckStatus::Fail, message, start);
        }
    };

    let rows: Result<Vec<(String, bool)>, tokio_rusqlite::Error<rusqlite::Error>> = conn
        .call(|conn| {
            let mut stmt = conn.prepare("SELECT username, is_active FROM users WHERE id IN (?1, ?2)")?;
            let rows = stmt.query_map([SEED_ADMIN_ID, SEED_SUPERADMIN_ID], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?;
            rows.collect()
        })
        .await;

    match rows {
        Ok(rows) if rows.len() == 2 && rows.iter().all(|(_, active)| *active) => {
            CheckResult::new("Default accounts", CheckStatus::Pass, "present", start)
        }
        Ok(rows) if rows.len() == 2 => {
            let inactive: Vec<_> = rows
                .iter()
                .filter(|(_, active)| !active)
                .map(|(name, _)| name.as_str())
                .collect();
            CheckResult::new(
                "Default accounts",
                CheckStatus::Warn,
                format!("deactivated: {}", inactive.join(", ")),
                start,
            )
        }
        Ok(rows) => CheckResult::new(
            "Default accounts",
            CheckStatus::Warn,
            format!("{} of 2 present (missing ones are seeded on start)", rows.len()),
            start,
        ),
        Err(e) => CheckResult::new(
            "Default accounts",
            CheckStatus::Fail,
            format!("query failed: {e}"),
            start,
        ),
    }
}

/// The journal directory must be writable and its files parseable.
async fn check_journal(config: &GuestPulseConfig) -> CheckResult {
    let start = Instant::now();
    let journal = Journal::from_config(&config.journal, &config.feedback);
    match journal.health_check().await {
        Ok(HealthStatus::Healthy) => CheckResult::new(
            "Journal",
            CheckStatus::Pass,
            format!("writable: {}", journal.dir().display()),
            start,
        ),
        Ok(HealthStatus::Degraded(reason)) => {
            CheckResult::new("Journal", CheckStatus::Warn, reason, start)
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            CheckResult::new("Journal", CheckStatus::Fail, reason, start)
        }
        Err(e) => CheckResult::new("Journal", CheckStatus::Fail, e.to_string(), start),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serve::tests::temp_config;
    use crate::serve::{open_storage, seed_accounts};
    use guestpulse_core::StorageAdapter;

    #[tokio::test]
    async fn missing_database_warns() {
        let (config, _dir) = temp_config();
        let db_path = &config.storage.database_path;
        assert_eq!(check_database(db_path).await.status, CheckStatus::Warn);
        assert_eq!(check_migrations(db_path).await.status, CheckStatus::Warn);
        assert_eq!(check_seed_accounts(db_path).await.status, CheckStatus::Warn);
    }

    #[tokio::test]
    async fn initialized_database_passes() {
        let (config, _dir) = temp_config();
        let storage = open_storage(&config).await.unwrap();
        seed_accounts(&storage, &config).await.unwrap();
        storage.close().await.unwrap();

        let db_path = &config.storage.database_path;
        assert_eq!(check_database(db_path).await.status, CheckStatus::Pass);
        let migrations = check_migrations(db_path).await;
        assert_eq!(migrations.status, CheckStatus::Pass, "{}", migrations.message);
        assert_eq!(check_seed_accounts(db_path).await.status, CheckStatus::Pass);
        assert_eq!(check_journal(&config).await.status, CheckStatus::Pass);
    }

    #[test]
    fn default_config_is_flagged() {
        let config = GuestPulseConfig::default();
        let result = check_config(&config);
        assert_eq!(result.status, CheckStatus::Warn);
        assert!(result.message.contains("cookie_secret"));
        assert!(result.message.contains("access code"));
    }

    #[test]
    fn hardened_config_passes() {
        let mut config = GuestPulseConfig::default();
        config.auth.cookie_secret = Some("0123456789abcdef0123456789abcdef".into());
        config.auth.super_admin_access_code = "LOBBY-7731".into();
        assert_eq!(check_config(&config).status, CheckStatus::Pass);
    }

    #[test]
    fn plain_rendering_uses_tags() {
        let result = CheckResult {
            name: "Journal".into(),
            status: CheckStatus::Fail,
            message: "not writable".into(),
            duration: Duration::from_millis(3),
        };
        let line = render_line(&result, false);
        assert!(line.contains("[FAIL]"));
        assert!(line.contains("not writable (3ms)"));
    }
}
