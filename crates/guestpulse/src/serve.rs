// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `guestpulse serve` command implementation.
//!
//! Opens SQLite storage, seeds the default operator accounts, and serves the
//! HTTP API until SIGINT or SIGTERM. The WAL is checkpointed on the way out.

use std::sync::Arc;

use chrono::Utc;
use guestpulse_config::GuestPulseConfig;
use guestpulse_core::types::{SEED_ADMIN_ID, SEED_PASSWORD, SEED_SUPERADMIN_ID};
use guestpulse_core::{Clock, GuestPulseError, StorageAdapter, SystemClock};
use guestpulse_gateway::{start_server, AppState, GatewaySettings};
use guestpulse_journal::Journal;
use guestpulse_storage::SqliteStorage;
use guestpulse_vault::{hash_password, CookieSigner, PasswordParams};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Runs the `guestpulse serve` command.
pub async fn run_serve(config: GuestPulseConfig) -> Result<(), GuestPulseError> {
    init_tracing(&config.server.log_level);

    info!("starting guestpulse serve");

    let storage = open_storage(&config).await?;
    seed_accounts(&storage, &config).await?;

    let journal = Arc::new(Journal::from_config(&config.journal, &config.feedback));
    debug!(dir = %journal.dir().display(), "journal directory");

    let signer = CookieSigner::from_secret(config.auth.cookie_secret.as_deref())?;
    let state = AppState {
        storage: storage.clone(),
        journal,
        signer,
        clock: Arc::new(SystemClock),
        settings: Arc::new(GatewaySettings::from_config(&config)),
    };

    let cancel = install_signal_handler();
    let shutdown = {
        let cancel = cancel.clone();
        async move { cancel.cancelled().await }
    };

    let served = start_server(&config.server, state, shutdown).await;

    if let Err(e) = storage.close().await {
        warn!(error = %e, "WAL checkpoint on shutdown failed");
    }
    info!("guestpulse serve shutdown complete");
    served
}

/// Open and migrate the configured database.
pub(crate) async fn open_storage(
    config: &GuestPulseConfig,
) -> Result<Arc<SqliteStorage>, GuestPulseError> {
    if let Some(parent) = std::path::Path::new(&config.storage.database_path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(GuestPulseError::storage)?;
    }
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    Ok(Arc::new(storage))
}

/// Create the `admin` and `superadmin` accounts when either is missing.
///
/// Returns the number of accounts created.
pub(crate) async fn seed_accounts(
    storage: &SqliteStorage,
    config: &GuestPulseConfig,
) -> Result<usize, GuestPulseError> {
    let mut missing = false;
    for id in [SEED_ADMIN_ID, SEED_SUPERADMIN_ID] {
        missing |= storage.get_user(id).await?.is_none();
    }
    if !missing {
        return Ok(0);
    }

    let params = PasswordParams::from(&config.auth);
    let (admin_hash, superadmin_hash) = tokio::task::spawn_blocking(move || {
        Ok::<_, GuestPulseError>((
            hash_password(SEED_PASSWORD, &params)?,
            hash_password(SEED_PASSWORD, &params)?,
        ))
    })
    .await
    .map_err(|e| GuestPulseError::Internal(format!("password hashing panicked: {e}")))??;

    let created = storage
        .seed_default_users(admin_hash, superadmin_hash, SystemClock.now())
        .await?;
    if created > 0 {
        warn!(
            created,
            "default accounts use the shipped password; change it with `guestpulse user reset-password`"
        );
    }
    Ok(created)
}

/// Returns a token cancelled on SIGINT or SIGTERM.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => info!("received SIGINT (Ctrl+C), initiating shutdown"),
                        _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler; only Ctrl+C stops the server");
                    let _ = ctrl_c.await;
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// `RUST_LOG` wins. Otherwise every `guestpulse*` target logs at `log_level`
/// and request traces at info.
fn log_filter(log_level: &str) -> String {
    format!("guestpulse={log_level},tower_http=info,warn")
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();

    debug!(started_at = %Utc::now(), "tracing initialized");
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use guestpulse_core::Role;
    use tempfile::TempDir;

    /// A config rooted in a temp dir with cheap password hashing.
    pub(crate) fn temp_config() -> (GuestPulseConfig, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = GuestPulseConfig::default();
        config.storage.database_path = dir
            .path()
            .join("db")
            .join("guestpulse.db")
            .to_string_lossy()
            .into_owned();
        config.journal.data_dir = dir.path().join("data").to_string_lossy().into_owned();
        config.auth.password_memory_cost = 8;
        config.auth.password_iterations = 1;
        config.auth.password_parallelism = 1;
        (config, dir)
    }

    #[tokio::test]
    async fn open_storage_creates_parent_directory() {
        let (config, _dir) = temp_config();
        let storage = open_storage(&config).await.unwrap();
        assert!(std::path::Path::new(&config.storage.database_path).exists());
        storage.close().await.unwrap();
    }

    #[tokio::test]
    async fn seeding_runs_once() {
        let (config, _dir) = temp_config();
        let storage = open_storage(&config).await.unwrap();

        assert_eq!(seed_accounts(&storage, &config).await.unwrap(), 2);
        assert_eq!(seed_accounts(&storage, &config).await.unwrap(), 0);

        let superadmin = storage.get_user(SEED_SUPERADMIN_ID).await.unwrap().unwrap();
        assert_eq!(superadmin.role, Role::Superadmin);
        assert!(guestpulse_vault::verify_password(SEED_PASSWORD, &superadmin.password_hash).unwrap());
        storage.close().await.unwrap();
    }

    #[test]
    fn log_filter_keeps_request_traces() {
        let filter = log_filter("debug");
        assert!(filter.starts_with("guestpulse=debug,"));
        assert!(filter.contains("tower_http=info"));
        assert!(filter.ends_with(",warn"));
    }
}
