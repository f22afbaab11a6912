// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait: the single repository for users, reviews,
//! voting sessions and votes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::GuestPulseError;
use crate::review::Review;
use crate::session::{SessionPatch, VotingSession};
use crate::traits::adapter::PluginAdapter;
use crate::types::{Page, PageRequest};
use crate::user::{User, UserPatch};
use crate::vote::Vote;

/// Adapter for relational persistence backends.
///
/// Lookups return `Option` and deletes return `bool`; turning a miss into
/// `NotFound` is the caller's decision.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), GuestPulseError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), GuestPulseError>;

    // --- Users ---

    async fn create_user(&self, user: &User) -> Result<(), GuestPulseError>;

    async fn get_user(&self, id: &str) -> Result<Option<User>, GuestPulseError>;

    async fn get_user_by_username(&self, username: &str)
    -> Result<Option<User>, GuestPulseError>;

    async fn list_users(&self) -> Result<Vec<User>, GuestPulseError>;

    /// Partially update a user. Returns the updated row, or `None` if unknown.
    async fn update_user(
        &self,
        id: &str,
        patch: &UserPatch,
    ) -> Result<Option<User>, GuestPulseError>;

    async fn delete_user(&self, id: &str) -> Result<bool, GuestPulseError>;

    async fn record_login(&self, id: &str, at: DateTime<Utc>) -> Result<(), GuestPulseError>;

    // --- Reviews ---

    async fn insert_review(&self, review: &Review) -> Result<(), GuestPulseError>;

    /// Reviews ordered by submission time, newest first.
    async fn list_reviews(&self, page: PageRequest) -> Result<Page<Review>, GuestPulseError>;

    /// Every review, newest first, for analytics and export.
    async fn all_reviews(&self) -> Result<Vec<Review>, GuestPulseError>;

    // --- Voting sessions ---

    async fn create_voting_session(&self, session: &VotingSession)
    -> Result<(), GuestPulseError>;

    async fn get_voting_session(&self, id: &str)
    -> Result<Option<VotingSession>, GuestPulseError>;

    async fn get_voting_session_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<VotingSession>, GuestPulseError>;

    /// All sessions ordered by creation, newest first.
    async fn list_voting_sessions(&self) -> Result<Vec<VotingSession>, GuestPulseError>;

    /// Partially update a session. Returns the updated row, or `None` if unknown.
    async fn update_voting_session(
        &self,
        id: &str,
        patch: &SessionPatch,
        at: DateTime<Utc>,
    ) -> Result<Option<VotingSession>, GuestPulseError>;

    /// Set `expired` on a session that is still `active` with `end_time <= now`.
    /// Returns the expired row, or `None` if the row is unknown or not overdue.
    async fn expire_voting_session(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<VotingSession>, GuestPulseError>;

    /// Delete a session and its votes.
    async fn delete_voting_session(&self, id: &str) -> Result<bool, GuestPulseError>;

    // --- Votes ---

    async fn insert_vote(&self, vote: &Vote) -> Result<(), GuestPulseError>;

    async fn list_votes(&self, session_id: &str) -> Result<Vec<Vote>, GuestPulseError>;
}
