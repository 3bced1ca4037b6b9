//! Page/limit query parameters for list endpoints.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
/// Limits at or above this are replaced by [`DEFAULT_LIMIT`].
pub const MAX_LIMIT: i64 = 100;

/// Pagination state: bound from the query string, echoed back with `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Computed server-side; a `total` in the query string is ignored.
    #[serde(default, skip_deserializing)]
    pub total: i64,
}

fn default_page() -> i64 {
    DEFAULT_PAGE
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            total: 0,
        }
    }
}

impl Paging {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page,
            limit,
            total: 0,
        }
    }

    /// Clamp `page` and `limit` into usable bounds.
    ///
    /// A page below 1 becomes 1. A limit that is not positive, or is
    /// [`MAX_LIMIT`] or more, becomes [`DEFAULT_LIMIT`].
    pub fn process(&mut self) {
        if self.page <= 0 {
            self.page = DEFAULT_PAGE;
        }
        if self.limit <= 0 || self.limit >= MAX_LIMIT {
            self.limit = DEFAULT_LIMIT;
        }
    }

    /// Row offset of the first item on this page. Saturates, so a huge page
    /// yields an empty result instead of overflowing.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}
