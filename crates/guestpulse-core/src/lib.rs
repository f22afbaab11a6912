// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for GuestPulse.
//!
//! This crate provides the domain types (operators, reviews, voting sessions,
//! votes), the voting-session state machine, the error taxonomy, and the
//! storage adapter trait used throughout the workspace.

pub mod clock;
pub mod error;
pub mod review;
pub mod session;
pub mod traits;
pub mod types;
pub mod user;
pub mod vote;

// Re-export key items at crate root for ergonomic imports.
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::GuestPulseError;
pub use review::{NewReview, Review, ServiceKey, ServiceRating};
pub use session::{
    DurationLimits, LinkVerdict, NewSession, SessionAction, SessionPatch, SessionStatus, SessionUpdate,
    VotingSession, verify_link,
};
pub use types::{AdapterType, HealthStatus, Page, PageRequest, Pagination};
pub use user::{Role, User, UserPatch};
pub use vote::{NewVote, Vote};

pub use traits::{PluginAdapter, StorageAdapter};
