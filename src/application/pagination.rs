//! Shared page-number pagination helpers.

use serde::Serialize;

/// Pagination metadata for one page of results.
///
/// Invariants: `total_pages = ceil(total_count / page_size)`,
/// `has_next = current_page < total_pages`, `has_prev = current_page > 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub has_next: bool,
    pub has_prev: bool,
    pub page_size: u32,
}

/// One page of items plus its metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, meta: PageMeta) -> Self {
        Self { items, meta }
    }
}

/// Compute pagination metadata for a total match count. Pure function;
/// `page_size` is assumed already clamped to at least 1 by the query builder.
pub fn compute_pagination(total_count: u64, current_page: u32, page_size: u32) -> PageMeta {
    let size = u64::from(page_size.max(1));
    let total_pages = u32::try_from(total_count.div_ceil(size)).unwrap_or(u32::MAX);
    PageMeta {
        current_page,
        total_pages,
        total_count,
        has_next: current_page < total_pages,
        has_prev: current_page > 1,
        page_size: page_size.max(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_page_of_twenty_five() {
        let meta = compute_pagination(25, 3, 10);
        assert_eq!(meta.total_pages, 3);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
        assert_eq!(meta.total_count, 25);
    }

    #[test]
    fn first_page_has_no_previous() {
        let meta = compute_pagination(25, 1, 10);
        assert!(meta.has_next);
        assert!(!meta.has_prev);
    }

    #[test]
    fn empty_result_set() {
        let meta = compute_pagination(0, 1, 10);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
    }

    #[test]
    fn exact_multiple_has_no_partial_page() {
        let meta = compute_pagination(30, 3, 10);
        assert_eq!(meta.total_pages, 3);
        assert!(!meta.has_next);
    }
}
