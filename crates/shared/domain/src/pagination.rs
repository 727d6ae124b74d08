//! Pagination types for paged queries.

use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use crate::constants::FIRST_PAGE;

/// Number of pages needed to show `total_items`.
///
/// Never returns 0: an empty result set still has one (empty) page.
pub fn page_count(total_items: u64, items_per_page: NonZeroU64) -> u64 {
    total_items.div_ceil(items_per_page.get()).max(FIRST_PAGE)
}

/// The slice of a sorted result set served for one page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Requested page clamped into `[1, total_pages]`
    pub page: u64,
    pub total_pages: u64,
    /// Rows to skip before the page starts
    pub skip: u64,
    /// Rows to take, `None` when the whole set fits on one page
    pub take: Option<u64>,
}

impl PageWindow {
    /// Resolve a requested page against the total item count.
    ///
    /// Out-of-range pages are corrected in a single step: anything past
    /// the end maps to the last page, anything below 1 maps to page 1.
    pub fn resolve(requested_page: i64, items_per_page: NonZeroU64, total_items: u64) -> Self {
        let total_pages = page_count(total_items, items_per_page);
        let page = u64::try_from(requested_page)
            .unwrap_or(FIRST_PAGE)
            .clamp(FIRST_PAGE, total_pages);

        let per_page = items_per_page.get();
        let (skip, take) = if total_items > per_page {
            ((page - 1) * per_page, Some(per_page))
        } else {
            (0, None)
        };

        Self {
            page,
            total_pages,
            skip,
            take,
        }
    }
}

/// One page of an ordered collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionPage<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub total_pages: u64,
    /// The page actually served after clamping
    pub page: u64,
}

impl<T> CollectionPage<T> {
    /// Build a page from materialized items and the window that produced them
    pub fn new(items: Vec<T>, total_items: u64, window: PageWindow) -> Self {
        Self {
            items,
            total_items,
            total_pages: window.total_pages,
            page: window.page,
        }
    }

    pub fn is_last_page(&self) -> bool {
        self.page >= self.total_pages
    }
}
