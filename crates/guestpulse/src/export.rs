// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `guestpulse export` command implementation.

use std::path::{Path, PathBuf};

use guestpulse_analytics::{export_filename, write_reviews_csv};
use guestpulse_config::GuestPulseConfig;
use guestpulse_core::{Clock, GuestPulseError, StorageAdapter, SystemClock};

use crate::serve::open_storage;

/// Write every review, oldest first, to `output` or to the dated default name.
pub async fn run_export(
    config: &GuestPulseConfig,
    output: Option<PathBuf>,
) -> Result<(), GuestPulseError> {
    let output =
        output.unwrap_or_else(|| PathBuf::from(export_filename(SystemClock.now().date_naive())));

    let storage = open_storage(config).await?;
    let reviews = storage.all_reviews().await;
    storage.close().await?;
    let reviews = reviews?;

    write_csv(&output, &reviews)?;
    eprintln!("Exported {} reviews to {}", reviews.len(), output.display());
    Ok(())
}

fn write_csv(path: &Path, reviews: &[guestpulse_core::Review]) -> Result<(), GuestPulseError> {
    let file = std::fs::File::create(path).map_err(GuestPulseError::storage)?;
    write_reviews_csv(reviews, std::io::BufWriter::new(file))
}
