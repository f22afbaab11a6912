// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the GuestPulse workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Id of the seeded `admin` account.
pub const SEED_ADMIN_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Id of the seeded `superadmin` account.
pub const SEED_SUPERADMIN_ID: &str = "00000000-0000-0000-0000-000000000002";

/// Initial password of both seeded accounts. Operators are expected to change it.
pub const SEED_PASSWORD: &str = "admin123";

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Journal,
}

/// Page request for bulk listings. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// One page of results plus the unpaged total.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Pagination metadata returned alongside a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        let limit = u64::from(request.limit.max(1));
        Self {
            page: request.page,
            limit: request.limit,
            total,
            total_pages: total.div_ceil(limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_offset_is_one_based() {
        assert_eq!(PageRequest { page: 1, limit: 10 }.offset(), 0);
        assert_eq!(PageRequest { page: 3, limit: 10 }.offset(), 20);
        assert_eq!(PageRequest { page: 0, limit: 10 }.offset(), 0);
    }

    #[test]
    fn pagination_rounds_total_pages_up() {
        let p = Pagination::new(PageRequest { page: 1, limit: 10 }, 21);
        assert_eq!(p.total_pages, 3);
        let empty = Pagination::new(PageRequest { page: 1, limit: 10 }, 0);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn pagination_serializes_camel_case() {
        let p = Pagination::new(PageRequest { page: 2, limit: 5 }, 7);
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"totalPages\":2"));
    }
}
