// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for GuestPulse.

use thiserror::Error;

/// The primary error type used across all GuestPulse adapter traits and core operations.
///
/// The first group of variants is client-facing and carries a message that is safe
/// to return verbatim. The second group describes server-side failures.
#[derive(Debug, Error)]
pub enum GuestPulseError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (wrong role, deactivated account).
    #[error("{0}")]
    Forbidden(String),

    /// Unknown id, slug or username.
    #[error("{0}")]
    NotFound(String),

    /// The resource existed but its usable window has closed.
    #[error("{0}")]
    Gone(String),

    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database, JSON journal files, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Password hashing and cookie signing failures.
    #[error("vault error: {0}")]
    Vault(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GuestPulseError {
    /// Wrap any error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        GuestPulseError::Storage {
            source: Box::new(err),
        }
    }

    /// True for errors caused by the caller rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            GuestPulseError::Validation(_)
                | GuestPulseError::Unauthorized(_)
                | GuestPulseError::Forbidden(_)
                | GuestPulseError::NotFound(_)
                | GuestPulseError::Gone(_)
        )
    }
}
