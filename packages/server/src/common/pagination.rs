//! Page/limit pagination for ledger browsing.
//!
//! The admin listing pages by offset; limits are clamped so a caller cannot
//! request unbounded result sets.

use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

/// Raw pagination query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageArgs {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageArgs {
    /// Clamp to sane bounds: page >= 1, 1 <= limit <= 100.
    pub fn validate(&self) -> ValidatedPage {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        ValidatedPage { page, limit }
    }
}

/// Validated pagination window.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedPage {
    pub page: i64,
    pub limit: i64,
}

impl ValidatedPage {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Pagination envelope returned alongside a listing.
#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

impl PageInfo {
    pub fn new(total: i64, page: ValidatedPage) -> Self {
        Self {
            total,
            page: page.page,
            total_pages: (total + page.limit - 1) / page.limit.max(1),
        }
    }
}
