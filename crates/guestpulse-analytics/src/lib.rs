// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Review and vote analytics for GuestPulse.
//!
//! This crate provides:
//! - **NPS**: promoter/passive/detractor buckets, the score and its category label
//! - **Service averages**: per-service means with status labels and low-rated detection
//! - **Trend**: daily average overall rating
//! - **Vote summaries**: per-session criterion averages
//! - **CSV export**: the detailed review spreadsheet
//!
//! Everything here is a pure function over already-loaded records.

pub mod export;
pub mod filter;
pub mod nps;
pub mod report;
pub mod services;
pub mod trend;
pub mod votes;

pub use export::{export_filename, reviews_to_csv, write_reviews_csv};
pub use filter::{Period, ReviewFilter};
pub use nps::{NpsBucket, NpsCategory, NpsSummary};
pub use report::DashboardReport;
pub use services::{ServiceAverage, ServiceStatus};
pub use trend::TrendPoint;
pub use votes::VoteSummary;

/// Round half away from zero to `places` decimals.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// `part / whole` as a percentage, 0 when `whole` is 0.
pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
