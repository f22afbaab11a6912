// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! QR codes for voting links.

use guestpulse_core::GuestPulseError;
use qrcode::render::{svg, unicode};
use qrcode::QrCode;

const MIN_SVG_SIZE: u32 = 256;

fn encode(data: &str) -> Result<QrCode, GuestPulseError> {
    QrCode::new(data.as_bytes())
        .map_err(|e| GuestPulseError::Internal(format!("failed to encode QR code: {e}")))
}

/// Render `data` as a standalone SVG document.
pub fn render_svg(data: &str) -> Result<String, GuestPulseError> {
    let code = encode(data)?;
    Ok(code
        .render::<svg::Color<'_>>()
        .min_dimensions(MIN_SVG_SIZE, MIN_SVG_SIZE)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build())
}

/// Render `data` with half-block characters for a terminal.
pub fn render_terminal(data: &str) -> Result<String, GuestPulseError> {
    let code = encode(data)?;
    Ok(code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build())
}
