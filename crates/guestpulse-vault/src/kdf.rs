// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`),
//! so the parameters travel with each hash and can be raised later without
//! invalidating existing accounts.

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use guestpulse_config::model::AuthConfig;
use guestpulse_core::GuestPulseError;
use ring::rand::{SecureRandom, SystemRandom};

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordParams {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordParams {
    fn default() -> Self {
        Self::from(&AuthConfig::default())
    }
}

impl From<&AuthConfig> for PasswordParams {
    fn from(auth: &AuthConfig) -> Self {
        Self {
            memory_cost: auth.password_memory_cost,
            iterations: auth.password_iterations,
            parallelism: auth.password_parallelism,
        }
    }
}

impl PasswordParams {
    /// Cheapest parameters Argon2 accepts. Only for tests.
    pub fn insecure_fast() -> Self {
        Self {
            memory_cost: 8,
            iterations: 1,
            parallelism: 1,
        }
    }

    fn hasher(&self) -> Result<argon2::Argon2<'static>, GuestPulseError> {
        let params = argon2::Params::new(self.memory_cost, self.iterations, self.parallelism, None)
            .map_err(|e| GuestPulseError::Vault(format!("invalid Argon2id parameters: {e}")))?;
        Ok(argon2::Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            params,
        ))
    }
}

/// Hash a plaintext password into a PHC string.
pub fn hash_password(password: &str, params: &PasswordParams) -> Result<String, GuestPulseError> {
    let salt_bytes = generate_salt()?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| GuestPulseError::Vault(format!("failed to encode salt: {e}")))?;

    let hash = params
        .hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| GuestPulseError::Vault(format!("Argon2id hashing failed: {e}")))?;

    Ok(hash.to_string())
}

/// Check a plaintext password against a stored PHC string.
///
/// Returns `Ok(false)` on mismatch and an error only when the stored hash
/// itself is unreadable.
pub fn verify_password(password: &str, phc: &str) -> Result<bool, GuestPulseError> {
    let parsed = PasswordHash::new(phc)
        .map_err(|e| GuestPulseError::Vault(format!("stored password hash is malformed: {e}")))?;

    match argon2::Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(GuestPulseError::Vault(format!(
            "Argon2id verification failed: {e}"
        ))),
    }
}

/// Generate a random 16-byte salt for Argon2id.
pub fn generate_salt() -> Result<[u8; 16], GuestPulseError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; 16];
    rng.fill(&mut salt)
        .map_err(|_| GuestPulseError::Vault("failed to generate random salt".to_string()))?;
    Ok(salt)
}
