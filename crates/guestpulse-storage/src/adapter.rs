// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use guestpulse_config::model::StorageConfig;
use guestpulse_core::{
    AdapterType, GuestPulseError, HealthStatus, Page, PageRequest, PluginAdapter, Review,
    SessionPatch, StorageAdapter, User, UserPatch, Vote, VotingSession,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`StorageAdapter::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, GuestPulseError> {
        self.db.get().ok_or_else(|| GuestPulseError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    /// Insert the default `admin` and `superadmin` accounts if they are missing.
    pub async fn seed_default_users(
        &self,
        admin_hash: String,
        superadmin_hash: String,
        now: DateTime<Utc>,
    ) -> Result<usize, GuestPulseError> {
        let created =
            queries::users::seed_default_users(self.db()?, admin_hash, superadmin_hash, now)
                .await?;
        if created > 0 {
            info!(created, "seeded default operator accounts");
        }
        Ok(created)
    }

    async fn checkpoint(&self, db: &Database) -> Result<(), GuestPulseError> {
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, GuestPulseError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), GuestPulseError> {
        // Shutdown delegates to a checkpoint if the DB was initialized.
        if let Some(db) = self.db.get() {
            self.checkpoint(db).await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), GuestPulseError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| GuestPulseError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), GuestPulseError> {
        let db = self.db()?;
        self.checkpoint(db).await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Users ---

    async fn create_user(&self, user: &User) -> Result<(), GuestPulseError> {
        queries::users::create_user(self.db()?, user).await
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, GuestPulseError> {
        queries::users::get_user(self.db()?, id).await
    }

    async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, GuestPulseError> {
        queries::users::get_user_by_username(self.db()?, username).await
    }

    async fn list_users(&self) -> Result<Vec<User>, GuestPulseError> {
        queries::users::list_users(self.db()?).await
    }

    async fn update_user(
        &self,
        id: &str,
        patch: &UserPatch,
    ) -> Result<Option<User>, GuestPulseError> {
        queries::users::update_user(self.db()?, id, patch).await
    }

    async fn delete_user(&self, id: &str) -> Result<bool, GuestPulseError> {
        queries::users::delete_user(self.db()?, id).await
    }

    async fn record_login(&self, id: &str, at: DateTime<Utc>) -> Result<(), GuestPulseError> {
        queries::users::record_login(self.db()?, id, at).await
    }

    // --- Reviews ---

    async fn insert_review(&self, review: &Review) -> Result<(), GuestPulseError> {
        queries::reviews::insert_review(self.db()?, review).await
    }

    async fn list_reviews(&self, page: PageRequest) -> Result<Page<Review>, GuestPulseError> {
        queries::reviews::list_reviews(self.db()?, page).await
    }

    async fn all_reviews(&self) -> Result<Vec<Review>, GuestPulseError> {
        queries::reviews::all_reviews(self.db()?).await
    }

    // --- Voting sessions ---

    async fn create_voting_session(&self, session: &VotingSession) -> Result<(), GuestPulseError> {
        queries::sessions::create_session(self.db()?, session).await
    }

    async fn get_voting_session(
        &self,
        id: &str,
    ) -> Result<Option<VotingSession>, GuestPulseError> {
        queries::sessions::get_session(self.db()?, id).await
    }

    async fn get_voting_session_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<VotingSession>, GuestPulseError> {
        queries::sessions::get_session_by_slug(self.db()?, slug).await
    }

    async fn list_voting_sessions(&self) -> Result<Vec<VotingSession>, GuestPulseError> {
        queries::sessions::list_sessions(self.db()?).await
    }

    async fn update_voting_session(
        &self,
        id: &str,
        patch: &SessionPatch,
        at: DateTime<Utc>,
    ) -> Result<Option<VotingSession>, GuestPulseError> {
        queries::sessions::update_session(self.db()?, id, patch, at).await
    }

    async fn expire_voting_session(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<VotingSession>, GuestPulseError> {
        queries::sessions::expire_session(self.db()?, id, now).await
    }

    async fn delete_voting_session(&self, id: &str) -> Result<bool, GuestPulseError> {
        queries::sessions::delete_session(self.db()?, id).await
    }

    // --- Votes ---

    async fn insert_vote(&self, vote: &Vote) -> Result<(), GuestPulseError> {
        queries::votes::insert_vote(self.db()?, vote).await
    }

    async fn list_votes(&self, session_id: &str) -> Result<Vec<Vote>, GuestPulseError> {
        queries::votes::list_votes(self.db()?, session_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use guestpulse_core::types::SEED_ADMIN_ID;
    use guestpulse_core::{
        DurationLimits, NewSession, NewVote, Role, SessionAction, SessionStatus,
    };
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn sqlite_storage_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
        let result = storage.initialize().await;
        assert!(result.is_err(), "second initialize should fail");
    }

    #[tokio::test]
    async fn health_check_reflects_initialization() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert!(storage.health_check().await.is_err());
        storage.initialize().await.unwrap();
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn seeded_admin_is_visible_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("seed.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();

        assert_eq!(
            storage
                .seed_default_users("a".into(), "b".into(), now())
                .await
                .unwrap(),
            2
        );
        let admin = storage.get_user_by_username("admin").await.unwrap().unwrap();
        assert_eq!(admin.id, SEED_ADMIN_ID);
        assert_eq!(admin.role, Role::Admin);
        storage.close().await.unwrap();
    }

    #[tokio::test]
    async fn full_session_lifecycle_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("lifecycle.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();

        let session = VotingSession::create(
            NewSession {
                title: Some("Dinner".into()),
                duration: Some(30),
                ..NewSession::default()
            },
            &DurationLimits::default(),
            "sess-1".into(),
            "slug-1".into(),
            "creator".into(),
            now(),
        )
        .unwrap();
        storage.create_voting_session(&session).await.unwrap();

        let patch = session.transition(SessionAction::Start, now()).unwrap();
        let started = storage
            .update_voting_session("sess-1", &patch, now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(started.status, SessionStatus::Active);

        let vote = NewVote {
            food_quality: Some(4),
            service_quality: Some(4),
            ambiance: Some(4),
            value_for_money: Some(4),
            overall_experience: Some(4),
            ..NewVote::default()
        }
        .into_vote("v-1".into(), "sess-1".into(), now())
        .unwrap();
        storage.insert_vote(&vote).await.unwrap();
        assert_eq!(storage.list_votes("sess-1").await.unwrap().len(), 1);

        let listed = storage.list_voting_sessions().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(storage.delete_voting_session("sess-1").await.unwrap());
        assert!(storage.get_voting_session_by_slug("slug-1").await.unwrap().is_none());

        storage.shutdown().await.unwrap();
    }
}
