// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Votes cast through voting-session links.

use guestpulse_core::{GuestPulseError, Vote};
use rusqlite::{params, Row};

use crate::database::Database;
use crate::models::{decode_ts, encode_ts};

fn vote_from_row(row: &Row<'_>) -> Result<Vote, rusqlite::Error> {
    Ok(Vote {
        id: row.get(0)?,
        session_id: row.get(1)?,
        food_quality: row.get(2)?,
        service_quality: row.get(3)?,
        ambiance: row.get(4)?,
        value_for_money: row.get(5)?,
        overall_experience: row.get(6)?,
        comments: row.get(7)?,
        would_recommend: row.get(8)?,
        submitted_at: decode_ts(9, row.get(9)?)?,
    })
}

/// Insert a vote. Fails if the session does not exist.
pub async fn insert_vote(db: &Database, vote: &Vote) -> Result<(), GuestPulseError> {
    let vote = vote.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO votes (id, session_id, food_quality, service_quality, ambiance,
                                    value_for_money, overall_experience, comments,
                                    would_recommend, submitted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    vote.id,
                    vote.session_id,
                    vote.food_quality,
                    vote.service_quality,
                    vote.ambiance,
                    vote.value_for_money,
                    vote.overall_experience,
                    vote.comments,
                    vote.would_recommend,
                    encode_ts(vote.submitted_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All votes for one session, in submission order.
pub async fn list_votes(db: &Database, session_id: &str) -> Result<Vec<Vote>, GuestPulseError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, session_id, food_quality, service_quality, ambiance, value_for_money,
                        overall_experience, comments, would_recommend, submitted_at
                 FROM votes WHERE session_id = ?1 ORDER BY submitted_at ASC, id ASC",
            )?;
            let rows = stmt.query_map(params![session_id], vote_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::sessions;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use guestpulse_core::{DurationLimits, NewSession, NewVote, VotingSession};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 18, 0, 0).unwrap()
    }

    async fn seed_session(db: &Database, id: &str) {
        let session = VotingSession::create(
            NewSession {
                title: Some("Dinner".into()),
                duration: Some(30),
                auto_start: Some(true),
                ..NewSession::default()
            },
            &DurationLimits::default(),
            id.to_string(),
            format!("slug-{id}"),
            "creator".into(),
            now(),
        )
        .unwrap();
        sessions::create_session(db, &session).await.unwrap();
    }

    fn make_vote(id: &str, session_id: &str, offset_secs: i64) -> Vote {
        NewVote {
            food_quality: Some(5),
            service_quality: Some(4),
            ambiance: Some(3),
            value_for_money: Some(4),
            overall_experience: Some(5),
            comments: Some("lovely".into()),
            would_recommend: Some(true),
        }
        .into_vote(
            id.to_string(),
            session_id.to_string(),
            now() + Duration::seconds(offset_secs),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn insert_and_list_votes() {
        let (db, _dir) = setup_db().await;
        seed_session(&db, "s-1").await;
        seed_session(&db, "s-2").await;

        let first = make_vote("v-1", "s-1", 1);
        insert_vote(&db, &first).await.unwrap();
        insert_vote(&db, &make_vote("v-2", "s-1", 2)).await.unwrap();
        insert_vote(&db, &make_vote("v-3", "s-2", 3)).await.unwrap();

        let votes = list_votes(&db, "s-1").await.unwrap();
        assert_eq!(votes.len(), 2);
        assert_eq!(votes[0], first);
        assert_eq!(votes[1].id, "v-2");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn vote_for_unknown_session_violates_foreign_key() {
        let (db, _dir) = setup_db().await;
        assert!(insert_vote(&db, &make_vote("v-1", "ghost", 0)).await.is_err());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn deleting_session_cascades_to_votes() {
        let (db, _dir) = setup_db().await;
        seed_session(&db, "s-1").await;
        insert_vote(&db, &make_vote("v-1", "s-1", 0)).await.unwrap();

        assert!(sessions::delete_session(&db, "s-1").await.unwrap());
        assert!(list_votes(&db, "s-1").await.unwrap().is_empty());
        db.close().await.unwrap();
    }
}
