// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HMAC-SHA256 signed session tokens for the auth cookies.
//!
//! Token layout: `<user_id>.<tier>.<expires_unix>.<hex signature>`. The
//! signature covers everything before the last dot.

use chrono::{DateTime, TimeZone, Utc};
use guestpulse_core::{GuestPulseError, Role};
use ring::hmac;
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// What a verified token asserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: String,
    pub tier: Role,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies auth cookie tokens.
#[derive(Clone)]
pub struct CookieSigner {
    key: hmac::Key,
}

impl std::fmt::Debug for CookieSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieSigner")
            .field("key", &"[redacted]")
            .finish()
    }
}

impl CookieSigner {
    /// Build a signer from raw key material.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret),
        }
    }

    /// Build a signer from the configured secret, or a random one when unset.
    pub fn from_secret(secret: Option<&str>) -> Result<Self, GuestPulseError> {
        match secret {
            Some(secret) => Ok(Self::new(secret.as_bytes())),
            None => {
                tracing::warn!(
                    "auth.cookie_secret is not set; using a random key, sessions will not survive a restart"
                );
                Self::random()
            }
        }
    }

    /// Build a signer around a fresh random 32-byte key.
    pub fn random() -> Result<Self, GuestPulseError> {
        let rng = SystemRandom::new();
        let mut secret = Zeroizing::new([0u8; 32]);
        rng.fill(secret.as_mut())
            .map_err(|_| GuestPulseError::Vault("failed to generate cookie key".to_string()))?;
        Ok(Self::new(secret.as_ref()))
    }

    /// Sign a token for `user_id` at `tier`, valid until `expires_at`.
    pub fn issue(&self, user_id: &str, tier: Role, expires_at: DateTime<Utc>) -> String {
        let payload = format!("{user_id}.{tier}.{}", expires_at.timestamp());
        let tag = hmac::sign(&self.key, payload.as_bytes());
        format!("{payload}.{}", hex::encode(tag.as_ref()))
    }

    /// Verify a token's signature and expiry.
    ///
    /// Returns `None` for anything that is not a well-formed, correctly signed,
    /// unexpired token.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Option<TokenClaims> {
        let (payload, signature) = token.rsplit_once('.')?;
        let signature = hex::decode(signature).ok()?;
        hmac::verify(&self.key, payload.as_bytes(), &signature).ok()?;

        let (rest, expires) = payload.rsplit_once('.')?;
        let (user_id, tier) = rest.rsplit_once('.')?;
        if user_id.is_empty() {
            return None;
        }
        let tier: Role = tier.parse().ok()?;
        let expires_at = Utc.timestamp_opt(expires.parse().ok()?, 0).single()?;
        if expires_at <= now {
            return None;
        }

        Some(TokenClaims {
            user_id: user_id.to_string(),
            tier,
            expires_at,
        })
    }
}
