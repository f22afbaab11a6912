// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential handling for GuestPulse.
//!
//! Two concerns live here: operator passwords are stored as Argon2id PHC
//! strings, and auth cookies carry an HMAC-SHA256 signed token so a client
//! cannot mint its own session by editing a cookie value.

pub mod cookie;
pub mod kdf;

pub use cookie::{CookieSigner, TokenClaims};
pub use kdf::{hash_password, verify_password, PasswordParams};
