// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator account CRUD and default-account seeding.

use chrono::{DateTime, Utc};
use guestpulse_core::types::{SEED_ADMIN_ID, SEED_SUPERADMIN_ID};
use guestpulse_core::{GuestPulseError, Role, User, UserPatch};
use rusqlite::{params, OptionalExtension, Row};

use crate::database::Database;
use crate::models::{decode_enum, decode_opt_ts, decode_ts, encode_ts};

const USER_COLUMNS: &str = "id, username, password_hash, role, is_active, created_at, created_by, \
                            last_login, updated_at, updated_by";

fn user_from_row(row: &Row<'_>) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        role: decode_enum(3, row.get(3)?)?,
        is_active: row.get(4)?,
        created_at: decode_ts(5, row.get(5)?)?,
        created_by: row.get(6)?,
        last_login: decode_opt_ts(7, row.get(7)?)?,
        updated_at: decode_opt_ts(8, row.get(8)?)?,
        updated_by: row.get(9)?,
    })
}

fn select_user(
    conn: &rusqlite::Connection,
    column: &str,
    value: &str,
) -> Result<Option<User>, rusqlite::Error> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1"),
        params![value],
        user_from_row,
    )
    .optional()
}

/// Turn a UNIQUE(username) violation into a client error and pass anything else through.
fn check_unique<T>(
    result: Result<T, rusqlite::Error>,
) -> Result<Result<T, GuestPulseError>, rusqlite::Error> {
    match result {
        Ok(value) => Ok(Ok(value)),
        Err(rusqlite::Error::SqliteFailure(failure, _))
            if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Ok(Err(GuestPulseError::Validation(
                "Username already exists".to_string(),
            )))
        }
        Err(e) => Err(e),
    }
}

/// Insert a new user.
pub async fn create_user(db: &Database, user: &User) -> Result<(), GuestPulseError> {
    let user = user.clone();
    db.connection()
        .call(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, username, password_hash, role, is_active, created_at,
                                    created_by, last_login, updated_at, updated_by)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    user.id,
                    user.username,
                    user.password_hash,
                    user.role.to_string(),
                    user.is_active,
                    encode_ts(user.created_at),
                    user.created_by,
                    user.last_login.map(encode_ts),
                    user.updated_at.map(encode_ts),
                    user.updated_by,
                ],
            );
            check_unique(inserted.map(|_| ()))
        })
        .await
        .map_err(crate::database::map_tr_err)?
}

/// Get a user by ID.
pub async fn get_user(db: &Database, id: &str) -> Result<Option<User>, GuestPulseError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| select_user(conn, "id", &id))
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a user by exact username.
pub async fn get_user_by_username(
    db: &Database,
    username: &str,
) -> Result<Option<User>, GuestPulseError> {
    let username = username.to_string();
    db.connection()
        .call(move |conn| select_user(conn, "username", &username))
        .await
        .map_err(crate::database::map_tr_err)
}

/// List every user, oldest first.
pub async fn list_users(db: &Database) -> Result<Vec<User>, GuestPulseError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, username ASC"
            ))?;
            let rows = stmt.query_map([], user_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Apply a partial update. Returns the updated row, or `None` if the id is unknown.
pub async fn update_user(
    db: &Database,
    id: &str,
    patch: &UserPatch,
) -> Result<Option<User>, GuestPulseError> {
    let id = id.to_string();
    let patch = patch.clone();
    db.connection()
        .call(move |conn| {
            let changed = check_unique(conn.execute(
                "UPDATE users SET
                    username = COALESCE(?1, username),
                    password_hash = COALESCE(?2, password_hash),
                    role = COALESCE(?3, role),
                    is_active = COALESCE(?4, is_active),
                    updated_by = COALESCE(?5, updated_by),
                    updated_at = COALESCE(?6, updated_at)
                 WHERE id = ?7",
                params![
                    patch.username,
                    patch.password_hash,
                    patch.role.map(|r| r.to_string()),
                    patch.is_active,
                    patch.updated_by,
                    patch.updated_at.map(encode_ts),
                    id,
                ],
            ))?;
            match changed {
                Ok(0) => Ok(Ok(None)),
                Ok(_) => select_user(conn, "id", &id).map(Ok),
                Err(e) => Ok(Err(e)),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?
}

/// Delete a user. Returns `false` if the id is unknown.
pub async fn delete_user(db: &Database, id: &str) -> Result<bool, GuestPulseError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let deleted = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Stamp `last_login`.
pub async fn record_login(
    db: &Database,
    id: &str,
    at: DateTime<Utc>,
) -> Result<(), GuestPulseError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE users SET last_login = ?1 WHERE id = ?2",
                params![encode_ts(at), id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert the default `admin` and `superadmin` accounts if absent.
///
/// Hashes are supplied by the caller so this crate never handles plaintext.
/// Returns the number of accounts created.
pub async fn seed_default_users(
    db: &Database,
    admin_hash: String,
    superadmin_hash: String,
    now: DateTime<Utc>,
) -> Result<usize, GuestPulseError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let mut inserted = 0;
            for (id, username, hash, role) in [
                (SEED_ADMIN_ID, "admin", admin_hash, Role::Admin),
                (SEED_SUPERADMIN_ID, "superadmin", superadmin_hash, Role::Superadmin),
            ] {
                inserted += tx.execute(
                    "INSERT OR IGNORE INTO users (id, username, password_hash, role, is_active,
                                                  created_at, created_by)
                     VALUES (?1, ?2, ?3, ?4, 1, ?5, 'system')",
                    params![id, username, hash, role.to_string(), encode_ts(now)],
                )?;
            }
            tx.commit()?;
            Ok(inserted)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
