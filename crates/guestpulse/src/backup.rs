// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `guestpulse backup` and `guestpulse restore` command implementation.
//!
//! Uses rusqlite's Backup API for consistent copies that work even while
//! the server is writing in WAL mode. The JSON journal files are not part
//! of the database; copy the journal directory alongside.

use std::path::Path;
use std::time::Duration;

use guestpulse_core::GuestPulseError;
use rusqlite::backup::Backup;
use rusqlite::{Connection, OpenFlags};

fn not_found(what: &str, path: &str) -> GuestPulseError {
    GuestPulseError::storage(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("{what} not found: {path}"),
    ))
}

/// Copy every page from `src` into `dst`, 100 pages per step.
fn copy_pages(src: &Connection, dst: &mut Connection) -> Result<(), GuestPulseError> {
    let backup = Backup::new(src, dst).map_err(GuestPulseError::storage)?;
    // The pause between steps lets a running server keep writing.
    backup
        .run_to_completion(100, Duration::from_millis(10), None)
        .map_err(GuestPulseError::storage)
}

fn report_size(verb: &str, path: &str) -> Result<(), GuestPulseError> {
    let metadata = std::fs::metadata(path).map_err(GuestPulseError::storage)?;
    let size_mb = metadata.len() as f64 / (1024.0 * 1024.0);
    eprintln!("{verb} complete: {size_mb:.1} MB written to {path}");
    Ok(())
}

/// Back up the SQLite database to `backup_path`.
pub fn run_backup(db_path: &str, backup_path: &str) -> Result<(), GuestPulseError> {
    if !Path::new(db_path).exists() {
        return Err(not_found("database", db_path));
    }

    let src = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(GuestPulseError::storage)?;
    let mut dst = Connection::open(backup_path).map_err(GuestPulseError::storage)?;
    copy_pages(&src, &mut dst)?;

    report_size("Backup", backup_path)
}

/// Restore the database from a backup file.
///
/// The current database, if any, is first copied to `<db>.pre-restore`.
/// The source must be a readable SQLite database with a `users` table.
pub fn run_restore(db_path: &str, restore_from: &str) -> Result<(), GuestPulseError> {
    if !Path::new(restore_from).exists() {
        return Err(not_found("backup file", restore_from));
    }

    let src = Connection::open_with_flags(restore_from, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(GuestPulseError::storage)?;
    let has_users: i64 = src
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'users'",
            [],
            |row| row.get(0),
        )
        .map_err(GuestPulseError::storage)?;
    if has_users == 0 {
        return Err(GuestPulseError::Validation(format!(
            "{restore_from} is not a GuestPulse database"
        )));
    }

    if Path::new(db_path).exists() {
        let pre_restore_path = format!("{db_path}.pre-restore");
        eprintln!("Creating safety backup: {pre_restore_path}");
        run_backup(db_path, &pre_restore_path)?;
    }

    let mut dst = Connection::open(db_path).map_err(GuestPulseError::storage)?;
    copy_pages(&src, &mut dst)?;

    report_size("Restore", db_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_db(path: &Path, username: &str) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (id TEXT PRIMARY KEY, username TEXT NOT NULL);",
        )
        .unwrap();
        conn.execute(
            "INSERT INTO users (id, username) VALUES (?1, ?1)",
            [username],
        )
        .unwrap();
    }

    fn usernames(path: &Path) -> Vec<String> {
        let conn = Connection::open(path).unwrap();
        let mut stmt = conn.prepare("SELECT username FROM users ORDER BY username").unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn backup_copies_rows() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("live.db");
        let copy = dir.path().join("copy.db");
        make_db(&db, "frontdesk");

        run_backup(db.to_str().unwrap(), copy.to_str().unwrap()).unwrap();
        assert_eq!(usernames(&copy), ["frontdesk"]);
    }

    #[test]
    fn backup_of_missing_database_fails() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.db");
        let copy = dir.path().join("copy.db");
        assert!(run_backup(missing.to_str().unwrap(), copy.to_str().unwrap()).is_err());
        assert!(!copy.exists());
    }

    #[test]
    fn restore_keeps_pre_restore_copy() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("live.db");
        let snapshot = dir.path().join("snapshot.db");
        make_db(&snapshot, "night-manager");
        make_db(&db, "frontdesk");

        run_restore(db.to_str().unwrap(), snapshot.to_str().unwrap()).unwrap();

        assert_eq!(usernames(&db), ["night-manager"]);
        let pre = dir.path().join("live.db.pre-restore");
        assert_eq!(usernames(&pre), ["frontdesk"]);
    }

    #[test]
    fn restore_rejects_foreign_database() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("live.db");
        let other = dir.path().join("other.db");
        Connection::open(&other)
            .unwrap()
            .execute_batch("CREATE TABLE notes (body TEXT);")
            .unwrap();
        make_db(&db, "frontdesk");

        let err = run_restore(db.to_str().unwrap(), other.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, GuestPulseError::Validation(_)));
        assert_eq!(usernames(&db), ["frontdesk"]);
        assert!(!dir.path().join("live.db.pre-restore").exists());
    }
}
