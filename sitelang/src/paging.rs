//! Page arithmetic for catalog listings

use crate::store::TranslationQuery;
use serde::Serialize;

/// Accepted page sizes; anything else falls back to the first
pub const PAGE_SIZES: [usize; 3] = [50, 100, 250];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl Page {
    /// Normalise a requested page against `total` matching rows
    pub fn new(requested_page: usize, requested_per_page: usize, total: usize) -> Self {
        let per_page = if PAGE_SIZES.contains(&requested_per_page) {
            requested_per_page
        } else {
            PAGE_SIZES[0]
        };
        let total_pages = total.div_ceil(per_page).max(1);
        let page = requested_page.clamp(1, total_pages);
        Page {
            page,
            per_page,
            total,
            total_pages,
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1) * self.per_page
    }

    /// Apply this page's limit and offset to `query`
    pub fn apply(&self, query: TranslationQuery) -> TranslationQuery {
        query.paginate(self.per_page, self.offset())
    }
}
