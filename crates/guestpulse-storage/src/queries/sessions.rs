// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Voting session CRUD operations.

use chrono::{DateTime, Utc};
use guestpulse_core::{GuestPulseError, SessionPatch, VotingSession};
use rusqlite::{params, OptionalExtension, Row};

use crate::database::Database;
use crate::models::{decode_enum, decode_opt_ts, decode_ts, encode_ts};

const SESSION_COLUMNS: &str = "id, title, description, duration_minutes, status, start_time, \
                               end_time, unique_link_slug, created_by, created_at, updated_at";

fn session_from_row(row: &Row<'_>) -> Result<VotingSession, rusqlite::Error> {
    Ok(VotingSession {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        duration_minutes: row.get(3)?,
        status: decode_enum(4, row.get(4)?)?,
        start_time: decode_opt_ts(5, row.get(5)?)?,
        end_time: decode_opt_ts(6, row.get(6)?)?,
        unique_link_slug: row.get(7)?,
        created_by: row.get(8)?,
        created_at: decode_ts(9, row.get(9)?)?,
        updated_at: decode_ts(10, row.get(10)?)?,
    })
}

fn select_session(
    conn: &rusqlite::Connection,
    column: &str,
    value: &str,
) -> Result<Option<VotingSession>, rusqlite::Error> {
    conn.query_row(
        &format!("SELECT {SESSION_COLUMNS} FROM voting_sessions WHERE {column} = ?1"),
        params![value],
        session_from_row,
    )
    .optional()
}

/// Create a new voting session.
pub async fn create_session(db: &Database, session: &VotingSession) -> Result<(), GuestPulseError> {
    let session = session.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO voting_sessions (id, title, description, duration_minutes, status,
                                              start_time, end_time, unique_link_slug, created_by,
                                              created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    session.id,
                    session.title,
                    session.description,
                    session.duration_minutes,
                    session.status.to_string(),
                    session.start_time.map(encode_ts),
                    session.end_time.map(encode_ts),
                    session.unique_link_slug,
                    session.created_by,
                    encode_ts(session.created_at),
                    encode_ts(session.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a session by ID.
pub async fn get_session(db: &Database, id: &str) -> Result<Option<VotingSession>, GuestPulseError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| select_session(conn, "id", &id))
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a session by its public link slug.
pub async fn get_session_by_slug(
    db: &Database,
    slug: &str,
) -> Result<Option<VotingSession>, GuestPulseError> {
    let slug = slug.to_string();
    db.connection()
        .call(move |conn| select_session(conn, "unique_link_slug", &slug))
        .await
        .map_err(crate::database::map_tr_err)
}

/// List sessions, newest first.
pub async fn list_sessions(db: &Database) -> Result<Vec<VotingSession>, GuestPulseError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM voting_sessions ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map([], session_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Apply a partial update and stamp `updated_at`.
///
/// Returns the updated row, or `None` if the id is unknown.
pub async fn update_session(
    db: &Database,
    id: &str,
    patch: &SessionPatch,
    at: DateTime<Utc>,
) -> Result<Option<VotingSession>, GuestPulseError> {
    let id = id.to_string();
    let patch = patch.clone();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE voting_sessions SET
                    title = COALESCE(?1, title),
                    description = COALESCE(?2, description),
                    duration_minutes = COALESCE(?3, duration_minutes),
                    status = COALESCE(?4, status),
                    start_time = COALESCE(?5, start_time),
                    end_time = COALESCE(?6, end_time),
                    updated_at = ?7
                 WHERE id = ?8",
                params![
                    patch.title,
                    patch.description,
                    patch.duration_minutes,
                    patch.status.map(|s| s.to_string()),
                    patch.start_time.map(encode_ts),
                    patch.end_time.map(encode_ts),
                    encode_ts(at),
                    id,
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            select_session(conn, "id", &id)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark a session `expired` only if it is still `active` with its window
/// closed at `now`.
///
/// Returns the expired row, or `None` when the row is unknown or no longer
/// overdue (for example, paused or extended since it was read).
pub async fn expire_session(
    db: &Database,
    id: &str,
    now: DateTime<Utc>,
) -> Result<Option<VotingSession>, GuestPulseError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE voting_sessions SET status = 'expired', updated_at = ?1
                 WHERE id = ?2 AND status = 'active'
                   AND end_time IS NOT NULL AND end_time <= ?1",
                params![encode_ts(now), id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            select_session(conn, "id", &id)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a session and, through the foreign key, its votes.
pub async fn delete_session(db: &Database, id: &str) -> Result<bool, GuestPulseError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let deleted = conn.execute("DELETE FROM voting_sessions WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
