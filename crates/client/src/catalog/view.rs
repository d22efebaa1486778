//! Browsing cursor over one category listing.

use cartwheel_core::{CategoryId, PageKey, Pagination, SortMode};

/// The page and sort a caller is currently looking at.
///
/// Changing the sort mode or the category always returns to page 1; a page
/// number carried over from another ordering points at unrelated products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryView {
    category_id: CategoryId,
    page: u32,
    sort: Option<SortMode>,
    total_pages: Option<u32>,
}

impl CategoryView {
    /// Start at page 1 of a category with the default (newest) ordering.
    #[must_use]
    pub const fn new(category_id: CategoryId) -> Self {
        Self {
            category_id,
            page: 1,
            sort: Some(SortMode::Newest),
            total_pages: None,
        }
    }

    /// Start with an explicit sort mode, or the backend default with `None`.
    #[must_use]
    pub const fn with_sort(mut self, sort: Option<SortMode>) -> Self {
        self.sort = sort;
        self
    }

    /// Current category.
    #[must_use]
    pub const fn category_id(&self) -> &CategoryId {
        &self.category_id
    }

    /// Current 1-based page.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Current sort mode.
    #[must_use]
    pub const fn sort(&self) -> Option<SortMode> {
        self.sort
    }

    /// Total pages reported by the last loaded page, if any.
    #[must_use]
    pub const fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    /// Cache key for the current position.
    #[must_use]
    pub const fn key(&self) -> PageKey {
        PageKey::new(self.page, self.sort)
    }

    /// Switch category, returning to page 1.
    pub fn set_category(&mut self, category_id: CategoryId) {
        if self.category_id != category_id {
            self.category_id = category_id;
            self.page = 1;
            self.total_pages = None;
        }
    }

    /// Switch sort mode, returning to page 1.
    pub fn set_sort(&mut self, sort: Option<SortMode>) {
        if self.sort != sort {
            self.sort = sort;
            self.page = 1;
        }
    }

    /// Jump to a page, clamped to `1..=total_pages` when the total is known.
    pub fn set_page(&mut self, page: u32) {
        let upper = self.total_pages.filter(|&n| n > 0).unwrap_or(u32::MAX);
        self.page = page.clamp(1, upper);
    }

    /// Advance one page. Returns `false` if already on the last known page.
    pub fn next_page(&mut self) -> bool {
        if self.total_pages.is_some_and(|n| self.page >= n) {
            return false;
        }
        let Some(next) = self.page.checked_add(1) else {
            return false;
        };
        self.page = next;
        true
    }

    /// Go back one page. Returns `false` if already on page 1.
    pub const fn prev_page(&mut self) -> bool {
        if self.page <= 1 {
            return false;
        }
        self.page -= 1;
        true
    }

    /// Record the page range reported by a loaded page.
    pub const fn observe(&mut self, pagination: &Pagination) {
        self.total_pages = Some(pagination.total_pages);
    }
}
