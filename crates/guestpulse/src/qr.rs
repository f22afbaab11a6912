// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `guestpulse qr` command implementation.

use guestpulse_config::GuestPulseConfig;
use guestpulse_core::{GuestPulseError, StorageAdapter};
use guestpulse_gateway::GatewaySettings;

use crate::serve::open_storage;

/// Print the voting link for `slug` and a QR code that scans to it.
pub async fn run_qr(config: &GuestPulseConfig, slug: &str) -> Result<(), GuestPulseError> {
    let storage = open_storage(config).await?;
    let session = storage.get_voting_session_by_slug(slug).await;
    storage.close().await?;
    let session = session?
        .ok_or_else(|| GuestPulseError::NotFound(format!("no voting session with slug {slug}")))?;

    let (url, code) = link_and_code(config, slug)?;
    println!("{} ({})", session.title, session.status);
    println!("{url}");
    println!();
    println!("{code}");
    Ok(())
}

fn link_and_code(config: &GuestPulseConfig, slug: &str) -> Result<(String, String), GuestPulseError> {
    let url = GatewaySettings::from_config(config).voting_url(slug);
    let code = guestpulse_gateway::qr::render_terminal(&url)?;
    Ok((url, code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serve::tests::temp_config;

    #[test]
    fn link_uses_public_base_url() {
        let (mut config, _dir) = temp_config();
        config.server.public_base_url = "https://feedback.example.com/".into();
        let (url, code) = link_and_code(&config, "d1f0").unwrap();
        assert_eq!(url, "https://feedback.example.com/vote/d1f0");
        assert!(!code.is_empty());
    }

    #[tokio::test]
    async fn unknown_slug_is_not_found() {
        let (config, _dir) = temp_config();
        let err = run_qr(&config, "missing").await.unwrap_err();
        assert!(matches!(err, GuestPulseError::NotFound(_)));
    }
}
