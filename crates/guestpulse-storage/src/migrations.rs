// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL migration files are compiled into the binary at build time via
//! `embed_migrations!`. Migrations run automatically on database open.

use guestpulse_core::GuestPulseError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending migrations against the given connection.
///
/// Refinery tracks applied migrations in its own `refinery_schema_history` table.
/// Returns the number of migrations applied by this call.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<usize, GuestPulseError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(GuestPulseError::storage)?;
    Ok(report.applied_migrations().len())
}

/// Names of every migration embedded in this build, in order.
pub fn embedded_migration_names() -> Vec<String> {
    embedded::migrations::runner()
        .get_migrations()
        .iter()
        .map(|m| format!("V{}__{}", m.version(), m.name()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_apply_to_fresh_database() {
        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        let applied = run_migrations(&mut conn).unwrap();
        assert_eq!(applied, embedded_migration_names().len());

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        for expected in ["reviews", "users", "votes", "voting_sessions"] {
            assert!(tables.iter().any(|t| t == expected), "missing table {expected}");
        }
    }

    #[test]
    fn migrations_are_idempotent() {
        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        assert_eq!(run_migrations(&mut conn).unwrap(), 0);
    }

    #[test]
    fn initial_schema_is_embedded() {
        let names = embedded_migration_names();
        assert_eq!(names.first().map(String::as_str), Some("V1__initial_schema"));
    }
}
