//! Pagination helper
//!
//! Turns a raw `?page=` value into a valid page of a result set and builds
//! the truncated page-number bar shown under list pages, e.g.
//! `1 … 4 5 [6] 7 8 … 20`.

use serde::{Serialize, Serializer};

/// Splits `count` items into pages of `per_page`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: i64,
    per_page: i64,
}

/// One page of a paginated result set
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number
    pub number: i64,
    pub num_pages: i64,
    /// Total number of items across all pages
    pub count: i64,
    pub per_page: i64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page_number: Option<i64>,
    pub next_page_number: Option<i64>,
    /// 1-based index of the first item on this page, 0 when empty
    pub start_index: i64,
    /// 1-based index of the last item on this page, 0 when empty
    pub end_index: i64,
    pub offset: i64,
    pub limit: i64,
}

/// An entry of the page-number bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(i64),
    Ellipsis,
}

impl Serialize for PageItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageItem::Page(number) => serializer.serialize_i64(*number),
            PageItem::Ellipsis => serializer.serialize_str("..."),
        }
    }
}

impl Paginator {
    /// A page size below 1 is treated as 1
    pub fn new(count: i64, per_page: i64) -> Self {
        Self {
            count: count.max(0),
            per_page: per_page.max(1),
        }
    }

    /// Number of pages; an empty result set still has one empty page
    pub fn num_pages(&self) -> i64 {
        ((self.count + self.per_page - 1) / self.per_page).max(1)
    }

    /// Resolve the raw `page` parameter to a page.
    ///
    /// Missing or non-integer values give page 1; integers outside
    /// `1..=num_pages` give the last page.
    pub fn get_page(&self, raw: Option<&str>) -> Page {
        let num_pages = self.num_pages();
        let number = match raw.map(|s| s.trim().parse::<i64>()) {
            None | Some(Err(_)) => 1,
            Some(Ok(n)) if n < 1 || n > num_pages => num_pages,
            Some(Ok(n)) => n,
        };
        self.page(number)
    }

    fn page(&self, number: i64) -> Page {
        let num_pages = self.num_pages();
        let offset = (number - 1) * self.per_page;
        let (start_index, end_index) = if self.count == 0 {
            (0, 0)
        } else if number == num_pages {
            (offset + 1, self.count)
        } else {
            (offset + 1, number * self.per_page)
        };

        Page {
            number,
            num_pages,
            count: self.count,
            per_page: self.per_page,
            has_previous: number > 1,
            has_next: number < num_pages,
            previous_page_number: (number > 1).then(|| number - 1),
            next_page_number: (number < num_pages).then(|| number + 1),
            start_index,
            end_index,
            offset,
            limit: self.per_page,
        }
    }
}

/// The page-number bar around `current`.
///
/// Shows up to two pages either side of `current`, marks skipped pages
/// with an ellipsis, and always starts at page 1 and ends at the last page.
pub fn page_range(current: i64, num_pages: i64) -> Vec<PageItem> {
    let last = num_pages.max(1);
    let current = current.clamp(1, last);
    let start = (current - 2).max(1);
    let end = (current + 2).min(last);

    let mut items: Vec<PageItem> = (start..=end).map(PageItem::Page).collect();

    if start - 1 >= 2 {
        items.insert(0, PageItem::Ellipsis);
    }
    if last - end >= 2 {
        items.push(PageItem::Ellipsis);
    }
    if items.first() != Some(&PageItem::Page(1)) {
        items.insert(0, PageItem::Page(1));
    }
    if items.last() != Some(&PageItem::Page(last)) {
        items.push(PageItem::Page(last));
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use PageItem::{Ellipsis, Page as P};

    #[test]
    fn test_missing_page_is_first() {
        let page = Paginator::new(20, 7).get_page(None);

        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 3);
        assert_eq!(page.offset, 0);
        assert_eq!(page.limit, 7);
        assert!(!page.has_previous);
        assert_eq!(page.next_page_number, Some(2));
    }

    #[test]
    fn test_non_integer_page_is_first() {
        let paginator = Paginator::new(20, 7);

        assert_eq!(paginator.get_page(Some("abc")).number, 1);
        assert_eq!(paginator.get_page(Some("")).number, 1);
        assert_eq!(paginator.get_page(Some("2.5")).number, 1);
    }

    #[test]
    fn test_out_of_range_page_is_last() {
        let paginator = Paginator::new(20, 7);

        assert_eq!(paginator.get_page(Some("0")).number, 3);
        assert_eq!(paginator.get_page(Some("-4")).number, 3);
        assert_eq!(paginator.get_page(Some("99")).number, 3);
        assert_eq!(paginator.get_page(Some(" 2 ")).number, 2);
    }

    #[test]
    fn test_last_page_indices() {
        let page = Paginator::new(20, 7).get_page(Some("3"));

        assert_eq!(page.offset, 14);
        assert_eq!(page.start_index, 15);
        assert_eq!(page.end_index, 20);
        assert!(page.has_previous);
        assert!(!page.has_next);
        assert_eq!(page.next_page_number, None);
    }

    #[test]
    fn test_empty_result_has_one_page() {
        let paginator = Paginator::new(0, 7);
        let page = paginator.get_page(Some("5"));

        assert_eq!(paginator.num_pages(), 1);
        assert_eq!(page.number, 1);
        assert_eq!(page.start_index, 0);
        assert_eq!(page.end_index, 0);
    }

    #[test]
    fn test_page_range_single_page() {
        assert_eq!(page_range(1, 1), vec![P(1)]);
    }

    #[test]
    fn test_page_range_middle_of_many() {
        assert_eq!(
            page_range(6, 20),
            vec![P(1), Ellipsis, P(4), P(5), P(6), P(7), P(8), Ellipsis, P(20)]
        );
    }

    #[test]
    fn test_page_range_near_edges() {
        assert_eq!(page_range(1, 10), vec![P(1), P(2), P(3), Ellipsis, P(10)]);
        assert_eq!(page_range(10, 10), vec![P(1), Ellipsis, P(8), P(9), P(10)]);
        assert_eq!(page_range(4, 7), vec![P(1), P(2), P(3), P(4), P(5), P(6), P(7)]);
    }

    #[test]
    fn test_page_item_serialization() {
        let json = serde_json::to_string(&page_range(5, 9)).unwrap();
        assert_eq!(json, r#"[1,"...",3,4,5,6,7,"...",9]"#);
    }

    proptest! {
        #[test]
        fn page_range_has_first_and_last(num_pages in 1i64..500, current in 1i64..500) {
            let current = current.min(num_pages);
            let items = page_range(current, num_pages);

            prop_assert_eq!(items.first(), Some(&P(1)));
            prop_assert_eq!(items.last(), Some(&P(num_pages)));
            prop_assert!(items.contains(&P(current)));
        }

        #[test]
        fn page_range_is_increasing_and_elides_real_gaps(num_pages in 1i64..500, current in 1i64..500) {
            let items = page_range(current.min(num_pages), num_pages);

            let mut previous: Option<i64> = None;
            let mut gap_pending = false;
            for item in items {
                match item {
                    P(n) => {
                        if let Some(p) = previous {
                            prop_assert!(n > p);
                            if gap_pending {
                                prop_assert!(n - p >= 2);
                            } else {
                                prop_assert_eq!(n, p + 1);
                            }
                        }
                        previous = Some(n);
                        gap_pending = false;
                    }
                    Ellipsis => {
                        prop_assert!(!gap_pending);
                        gap_pending = true;
                    }
                }
            }
        }

        #[test]
        fn get_page_is_always_valid(count in 0i64..1000, per_page in 1i64..50, raw in ".{0,6}") {
            let paginator = Paginator::new(count, per_page);
            let page = paginator.get_page(Some(&raw));

            prop_assert!(page.number >= 1);
            prop_assert!(page.number <= paginator.num_pages());
            prop_assert!(page.end_index <= count);
            prop_assert!(page.start_index <= page.end_index);
        }
    }
}
