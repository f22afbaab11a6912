// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from [`GuestPulseError`] to HTTP responses.
//!
//! Every failure is returned as `{"error": "<message>"}`. Client errors carry
//! their message verbatim; server-side failures are logged and replaced by a
//! generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use guestpulse_core::GuestPulseError;
use serde::Serialize;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A handler error.
#[derive(Debug)]
pub struct ApiError {
    error: GuestPulseError,
    server_message: &'static str,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Message shown instead of the details of a server-side failure.
    pub fn server_message(mut self, message: &'static str) -> Self {
        self.server_message = message;
        self
    }

    pub fn status(&self) -> StatusCode {
        status_for(&self.error)
    }

    pub fn inner(&self) -> &GuestPulseError {
        &self.error
    }
}

impl From<GuestPulseError> for ApiError {
    fn from(error: GuestPulseError) -> Self {
        Self {
            error,
            server_message: "Internal server error",
        }
    }
}

pub fn status_for(error: &GuestPulseError) -> StatusCode {
    match error {
        GuestPulseError::Validation(_) => StatusCode::BAD_REQUEST,
        GuestPulseError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        GuestPulseError::Forbidden(_) => StatusCode::FORBIDDEN,
        GuestPulseError::NotFound(_) => StatusCode::NOT_FOUND,
        GuestPulseError::Gone(_) => StatusCode::GONE,
        GuestPulseError::Config(_)
        | GuestPulseError::Storage { .. }
        | GuestPulseError::Vault(_)
        | GuestPulseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if self.error.is_client_error() {
            self.error.to_string()
        } else {
            tracing::error!(error = %self.error, "request failed");
            self.server_message.to_string()
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
