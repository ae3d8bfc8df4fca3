//! Client-side paging over the filtered result set.

/// Rows per dashboard page
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Number of pages needed for `len` items; never less than 1
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

/// Clamp a requested page (1-based) into `1..=total_pages`
pub fn effective_page(requested: usize, total_pages: usize) -> usize {
    requested.clamp(1, total_pages.max(1))
}

/// One page of a slice, plus where it sits in the whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlice<'a, T> {
    pub items: &'a [T],
    /// The page actually shown (1-based), after clamping
    pub page: usize,
    pub total_pages: usize,
}

impl<T> PageSlice<'_, T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Slice out page `requested` of `items`.
///
/// A stale page number past the end (e.g. after a filter shrank the list)
/// shows the last page instead.
pub fn paginate<T>(items: &[T], page_size: usize, requested: usize) -> PageSlice<'_, T> {
    let page_size = page_size.max(1);
    let total_pages = total_pages(items.len(), page_size);
    let page = effective_page(requested, total_pages);

    let start = ((page - 1) * page_size).min(items.len());
    let end = (start + page_size).min(items.len());

    PageSlice {
        items: &items[start..end],
        page,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 20, 1)]
    #[case(1, 20, 1)]
    #[case(20, 20, 1)]
    #[case(21, 20, 2)]
    #[case(45, 20, 3)]
    #[case(500, 20, 25)]
    fn test_total_pages(#[case] len: usize, #[case] page_size: usize, #[case] expected: usize) {
        assert_eq!(total_pages(len, page_size), expected);
    }

    #[test]
    fn test_stale_page_clamps_to_last() {
        let items: Vec<usize> = (0..45).collect();
        let page = paginate(&items, 20, 10);

        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 3);
        assert_eq!(page.items, &items[40..45]);
        assert!(!page.has_next());
        assert!(page.has_prev());
    }

    #[test]
    fn test_first_page() {
        let items: Vec<usize> = (0..45).collect();
        let page = paginate(&items, 20, 1);

        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.items[0], 0);
        assert!(page.has_next());
        assert!(!page.has_prev());
    }

    #[test]
    fn test_page_zero_is_treated_as_first() {
        let items: Vec<usize> = (0..5).collect();
        let page = paginate(&items, 20, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 5);
    }

    #[test]
    fn test_empty_input_has_one_empty_page() {
        let items: Vec<usize> = Vec::new();
        let page = paginate(&items, 20, 4);

        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_slicing_is_idempotent() {
        let items: Vec<usize> = (0..73).collect();
        let first = paginate(&items, 20, 2);
        let second = paginate(&items, 20, first.page);
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_page_size_does_not_panic() {
        let items: Vec<usize> = (0..3).collect();
        let page = paginate(&items, 0, 2);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items, &[1]);
    }
}
