// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for GuestPulse integration tests.
//!
//! [`TestHarness`] assembles temp SQLite storage, a temp journal directory,
//! a [`guestpulse_core::ManualClock`], the seeded operator accounts and the
//! axum router, then drives requests through `tower::ServiceExt::oneshot`.

pub mod harness;

pub use harness::{TestHarness, TestHarnessBuilder, TestResponse};
