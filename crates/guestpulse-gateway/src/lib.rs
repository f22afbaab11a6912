// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for GuestPulse.
//!
//! Serves the JSON API used by the guest feedback form, the voting pages and
//! the admin dashboards. Authentication is cookie based; the signed tokens are
//! verified by the middleware in [`auth`] and the resulting [`auth::Operator`]
//! is handed to handlers as a request extension.

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod qr;
pub mod server;

pub use auth::Operator;
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use server::{build_router, start_server, AppState, GatewaySettings};
