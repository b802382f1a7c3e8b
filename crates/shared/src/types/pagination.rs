//! Page-based listing of leave requests.

use serde::{Deserialize, Serialize};

/// Largest page a caller may ask for.
pub const MAX_PER_PAGE: u32 = 100;

/// Requested page, 1-indexed.
#[derive(Debug, Clone, Deserialize)]
pub struct PageRequest {
    /// Page number; `0` reads as the first page.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Rows per page, clamped to `1..=MAX_PER_PAGE`.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PageRequest {
    /// Effective page number.
    #[must_use]
    pub fn page_number(&self) -> u32 {
        self.page.max(1)
    }

    /// Effective page size.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }

    /// Rows to skip.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page_number() - 1) * self.limit()
    }

    /// Rows to fetch.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.page_size())
    }

    /// Wraps one fetched page out of `total` rows.
    #[must_use]
    pub fn respond<T>(&self, data: Vec<T>, total: u64) -> PageResponse<T> {
        let per_page = self.page_size();
        let total_pages = if total == 0 {
            1
        } else {
            u32::try_from(total.div_ceil(u64::from(per_page))).unwrap_or(u32::MAX)
        };
        PageResponse {
            data,
            meta: PageMeta {
                page: self.page_number(),
                per_page,
                total,
                total_pages,
            },
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
pub struct PageResponse<T> {
    /// Rows on this page.
    pub data: Vec<T>,
    /// Position of this page.
    pub meta: PageMeta,
}

/// Position of a page within the full result.
#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    /// Effective page number.
    pub page: u32,
    /// Effective page size.
    pub per_page: u32,
    /// Rows across all pages.
    pub total: u64,
    /// Never below one, even for an empty result.
    pub total_pages: u32,
}
