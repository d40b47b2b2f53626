//! Pagination types for list endpoints.

use serde::Serialize;

/// Smallest page size a client may request.
pub const MIN_PAGE_SIZE: u64 = 1;
/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: u64 = 100;
/// Page size used when the client sends none.
pub const DEFAULT_PAGE_SIZE: u64 = 10;
/// Highest page number; keeps the row offset within `i64`.
pub const MAX_PAGE_NUMBER: u64 = i64::MAX.unsigned_abs() / MAX_PAGE_SIZE;

/// Normalized paging parameters for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number (1-indexed).
    pub page_number: u64,
    /// Number of items per page.
    pub page_size: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Builds a page request, clamping out-of-range values.
    ///
    /// Negative values count as zero and are raised to the minimum.
    #[must_use]
    pub fn new(page_number: Option<i64>, page_size: Option<i64>) -> Self {
        let page_number = page_number.map_or(1, |n| u64::try_from(n).unwrap_or(0));
        let page_size = page_size.map_or(DEFAULT_PAGE_SIZE, |n| u64::try_from(n).unwrap_or(0));
        Self {
            page_number: page_number.clamp(1, MAX_PAGE_NUMBER),
            page_size: page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE),
        }
    }

    /// Calculates the offset for database queries.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page_number.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.page_size
    }
}

/// One page of results plus navigation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedList<T> {
    /// The items in the current page.
    pub items: Vec<T>,
    /// Current page number.
    pub page_number: u64,
    /// Total number of pages.
    pub total_pages: u64,
    /// Total number of items across all pages.
    pub total_count: u64,
    /// Whether a page precedes this one.
    pub has_previous_page: bool,
    /// Whether a page follows this one.
    pub has_next_page: bool,
}

impl<T> PagedList<T> {
    /// Creates a page from its items and the total match count.
    #[must_use]
    pub fn new(items: Vec<T>, request: &PageRequest, total_count: u64) -> Self {
        let total_pages = total_count.div_ceil(request.page_size.max(1));
        Self {
            items,
            page_number: request.page_number,
            total_pages,
            total_count,
            has_previous_page: request.page_number > 1,
            has_next_page: request.page_number < total_pages,
        }
    }

    /// Converts every item, keeping the paging metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedList<U> {
        PagedList {
            items: self.items.into_iter().map(f).collect(),
            page_number: self.page_number,
            total_pages: self.total_pages,
            total_count: self.total_count,
            has_previous_page: self.has_previous_page,
            has_next_page: self.has_next_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_page_request_default() {
        let request = PageRequest::new(None, None);
        assert_eq!(request, PageRequest::default());
        assert_eq!(request.page_number, 1);
        assert_eq!(request.page_size, 10);
    }

    #[rstest]
    #[case(Some(0), Some(0), 1, 1)]
    #[case(Some(3), Some(500), 3, 100)]
    #[case(Some(2), Some(25), 2, 25)]
    #[case(None, Some(100), 1, 100)]
    #[case(Some(-1), Some(-5), 1, 1)]
    #[case(Some(i64::MAX), Some(100), MAX_PAGE_NUMBER, 100)]
    fn test_page_request_clamps(
        #[case] page: Option<i64>,
        #[case] size: Option<i64>,
        #[case] expected_page: u64,
        #[case] expected_size: u64,
    ) {
        let request = PageRequest::new(page, size);
        assert_eq!(request.page_number, expected_page);
        assert_eq!(request.page_size, expected_size);
    }

    #[test]
    fn test_page_request_offset() {
        assert_eq!(PageRequest::new(Some(1), Some(20)).offset(), 0);
        assert_eq!(PageRequest::new(Some(3), Some(20)).offset(), 40);
        assert_eq!(PageRequest::new(Some(3), Some(20)).limit(), 20);

        let last = PageRequest::new(Some(i64::MAX), Some(100));
        assert!(i64::try_from(last.offset()).is_ok());
    }

    #[test]
    fn test_paged_list_new() {
        let list = PagedList::new(vec![1, 2, 3], &PageRequest::new(Some(1), Some(10)), 3);
        assert_eq!(list.items, vec![1, 2, 3]);
        assert_eq!(list.total_pages, 1);
        assert!(!list.has_previous_page);
        assert!(!list.has_next_page);
    }

    #[test]
    fn test_paged_list_middle_page() {
        // 25 items, 10 per page -> 3 pages
        let list: PagedList<i32> = PagedList::new(vec![], &PageRequest::new(Some(2), Some(10)), 25);
        assert_eq!(list.total_pages, 3);
        assert!(list.has_previous_page);
        assert!(list.has_next_page);
    }

    #[test]
    fn test_paged_list_empty() {
        let list: PagedList<i32> = PagedList::new(vec![], &PageRequest::default(), 0);
        assert_eq!(list.total_pages, 0);
        assert!(!list.has_next_page);
    }

    #[test]
    fn test_paged_list_serializes_camel_case() {
        let list = PagedList::new(vec!["a"], &PageRequest::default(), 1);
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["pageNumber"], 1);
        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["totalCount"], 1);
        assert_eq!(json["hasPreviousPage"], false);
        assert_eq!(json["hasNextPage"], false);
        assert_eq!(json["items"][0], "a");
    }

    #[test]
    fn test_paged_list_map() {
        let list = PagedList::new(vec![1, 2], &PageRequest::new(Some(1), Some(2)), 5);
        let mapped = list.map(|n| n * 10);
        assert_eq!(mapped.items, vec![10, 20]);
        assert_eq!(mapped.total_pages, 3);
        assert!(mapped.has_next_page);
    }

    proptest! {
        #[test]
        fn prop_last_page_has_no_next(
            page in -10i64..1_000,
            size in -10i64..500,
            total in 0u64..100_000,
        ) {
            let request = PageRequest::new(Some(page), Some(size));
            let list: PagedList<()> = PagedList::new(vec![], &request, total);

            if request.page_number * request.page_size >= total {
                prop_assert!(!list.has_next_page);
            }
            if request.page_number > 1 {
                prop_assert!(list.has_previous_page);
            }
            prop_assert!(list.total_pages * request.page_size >= total);
        }
    }
}
