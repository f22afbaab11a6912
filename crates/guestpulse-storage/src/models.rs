// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities, plus column codecs.
//!
//! The canonical types are defined in `guestpulse-core` for use across
//! adapter trait boundaries. Timestamps are stored as RFC 3339 text with
//! millisecond precision and a `Z` suffix, so lexical order is time order.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;

pub use guestpulse_core::{Review, User, Vote, VotingSession};

/// Encode a timestamp for a TEXT column.
pub fn encode_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Decode a TEXT timestamp column at `idx`.
pub(crate) fn decode_ts(idx: usize, raw: String) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Decode a nullable TEXT timestamp column at `idx`.
pub(crate) fn decode_opt_ts(
    idx: usize,
    raw: Option<String>,
) -> Result<Option<DateTime<Utc>>, rusqlite::Error> {
    raw.map(|s| decode_ts(idx, s)).transpose()
}

/// Decode a TEXT column holding a strum-encoded enum.
pub(crate) fn decode_enum<T>(idx: usize, raw: String) -> Result<T, rusqlite::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use guestpulse_core::{Role, SessionStatus};

    #[test]
    fn timestamps_round_trip_with_millis() {
        let ts = Utc.with_ymd_and_hms(2026, 5, 4, 3, 2, 1).unwrap()
            + chrono::Duration::milliseconds(250);
        let encoded = encode_ts(ts);
        assert_eq!(encoded, "2026-05-04T03:02:01.250Z");
        assert_eq!(decode_ts(0, encoded).unwrap(), ts);
    }

    #[test]
    fn bad_timestamp_is_a_conversion_failure() {
        let err = decode_ts(3, "yesterday".into()).unwrap_err();
        assert!(matches!(err, rusqlite::Error::FromSqlConversionFailure(3, Type::Text, _)));
    }

    #[test]
    fn enums_decode_from_lowercase_text() {
        let role: Role = decode_enum(0, "superadmin".into()).unwrap();
        assert_eq!(role, Role::Superadmin);
        let status: SessionStatus = decode_enum(0, "paused".into()).unwrap();
        assert_eq!(status, SessionStatus::Paused);
        assert!(decode_enum::<Role>(0, "root".into()).is_err());
    }
}
