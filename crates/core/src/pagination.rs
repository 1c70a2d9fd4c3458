//! Offset pagination: lenient input normalization and page metadata.
//!
//! Invalid `page`/`limit` inputs never fail a request; they are silently
//! normalized to defaults.

use serde::{Deserialize, Serialize};

/// Page size used when the caller supplies none or an invalid one.
pub const DEFAULT_PAGE_SIZE: i64 = 12;
/// Hard upper bound on the page size.
pub const MAX_PAGE_SIZE: i64 = 100;
/// Smallest accepted page size.
pub const MIN_PAGE_SIZE: i64 = 1;

/// Normalized pagination input: `page >= 1`, `limit` in `[1, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub limit: i64,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageParams {
    /// Clamps already-parsed values into the valid range.
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: if page < 1 { 1 } else { page },
            limit: if limit < MIN_PAGE_SIZE {
                DEFAULT_PAGE_SIZE
            } else {
                limit.min(MAX_PAGE_SIZE)
            },
        }
    }

    /// Normalizes raw query-string values of unknown validity.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: validate_page(page),
            limit: validate_limit(limit),
        }
    }

    /// Row offset for the validated page.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Parses a raw limit; non-numeric or `< 1` falls back to the default,
/// anything above the maximum is clamped.
pub fn validate_limit(raw: Option<&str>) -> i64 {
    match raw.and_then(|v| v.trim().parse::<i64>().ok()) {
        Some(parsed) if parsed >= MIN_PAGE_SIZE => parsed.min(MAX_PAGE_SIZE),
        _ => DEFAULT_PAGE_SIZE,
    }
}

/// Parses a raw page number; non-numeric or `< 1` falls back to 1.
pub fn validate_page(raw: Option<&str>) -> i64 {
    match raw.and_then(|v| v.trim().parse::<i64>().ok()) {
        Some(parsed) if parsed >= 1 => parsed,
        _ => 1,
    }
}

/// Page metadata reported alongside every paginated listing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_more: bool,
    pub has_previous: bool,
}

impl Pagination {
    pub fn new(params: &PageParams, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + params.limit - 1) / params.limit
        };
        Self {
            page: params.page,
            limit: params.limit,
            total,
            total_pages,
            has_more: params.page < total_pages,
            has_previous: params.page > 1,
        }
    }
}

/// A page of results together with its metadata.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}
