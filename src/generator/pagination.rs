//! Listing page partitioning
//!
//! Page count and page slices come from the same `Paginator`, so the
//! `total_pages` shown on a page always matches the files written.

use std::ops::Range;

/// File name of the first listing page
pub const FIRST_PAGE: &str = "index.html";

/// Splits `total` items into pages of `per_page`
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    total: usize,
    per_page: usize,
}

/// One listing page: its number and the slice of items it shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSpan {
    /// 1-based page number
    pub number: usize,
    pub total_pages: usize,
    pub items: Range<usize>,
}

impl Paginator {
    pub fn new(total: usize, per_page: usize) -> Self {
        Self {
            total,
            per_page: per_page.max(1),
        }
    }

    /// `ceil(total / per_page)`, but never less than one page
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.per_page).max(1)
    }

    pub fn pages(&self) -> impl Iterator<Item = PageSpan> + '_ {
        let total_pages = self.page_count();
        (1..=total_pages).map(move |number| {
            let start = ((number - 1) * self.per_page).min(self.total);
            let end = (start + self.per_page).min(self.total);
            PageSpan {
                number,
                total_pages,
                items: start..end,
            }
        })
    }
}

impl PageSpan {
    pub fn file_name(&self) -> String {
        page_file_name(self.number)
    }

    /// Link to the newer page; none on page 1
    pub fn prev_url(&self) -> Option<String> {
        (self.number > 1).then(|| page_file_name(self.number - 1))
    }

    /// Link to the older page; none on the last page
    pub fn next_url(&self) -> Option<String> {
        (self.number < self.total_pages).then(|| page_file_name(self.number + 1))
    }
}

/// `index.html` for page 1, `page-{n}.html` otherwise
pub fn page_file_name(number: usize) -> String {
    if number <= 1 {
        FIRST_PAGE.to_string()
    } else {
        format!("page-{}.html", number)
    }
}

/// Inverse of `page_file_name` for pages after the first
pub fn parse_page_file_name(name: &str) -> Option<usize> {
    let number: usize = name.strip_prefix("page-")?.strip_suffix(".html")?.parse().ok()?;
    (number >= 2).then_some(number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_items_is_one_empty_page() {
        let pages: Vec<_> = Paginator::new(0, 10).pages().collect();
        assert_eq!(
            pages,
            vec![PageSpan {
                number: 1,
                total_pages: 1,
                items: 0..0
            }]
        );
        assert_eq!(pages[0].prev_url(), None);
        assert_eq!(pages[0].next_url(), None);
        assert_eq!(pages[0].file_name(), "index.html");
    }

    #[test]
    fn test_twenty_five_items() {
        let pages: Vec<_> = Paginator::new(25, 10).pages().collect();
        assert_eq!(pages.len(), 3);

        assert_eq!(pages[0].items, 0..10);
        assert_eq!(pages[0].prev_url(), None);
        assert_eq!(pages[0].next_url().as_deref(), Some("page-2.html"));

        assert_eq!(pages[1].items, 10..20);
        assert_eq!(pages[1].file_name(), "page-2.html");
        assert_eq!(pages[1].prev_url().as_deref(), Some("index.html"));
        assert_eq!(pages[1].next_url().as_deref(), Some("page-3.html"));

        assert_eq!(pages[2].items, 20..25);
        assert_eq!(pages[2].prev_url().as_deref(), Some("page-2.html"));
        assert_eq!(pages[2].next_url(), None);
    }

    #[test]
    fn test_page_count_agrees_with_pages() {
        for per_page in 1..=12 {
            for total in 0..=40 {
                let paginator = Paginator::new(total, per_page);
                let pages: Vec<_> = paginator.pages().collect();
                assert_eq!(pages.len(), paginator.page_count());

                let covered: usize = pages.iter().map(|p| p.items.len()).sum();
                assert_eq!(covered, total);
                assert!(pages.iter().all(|p| p.total_pages == pages.len()));
                if total > 0 {
                    assert!(pages.iter().all(|p| !p.items.is_empty()));
                }
            }
        }
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_empty_page() {
        assert_eq!(Paginator::new(20, 10).page_count(), 2);
        assert_eq!(Paginator::new(21, 10).page_count(), 3);
    }

    #[test]
    fn test_parse_page_file_name() {
        assert_eq!(parse_page_file_name("page-2.html"), Some(2));
        assert_eq!(parse_page_file_name("page-17.html"), Some(17));
        assert_eq!(parse_page_file_name("page-1.html"), None);
        assert_eq!(parse_page_file_name("index.html"), None);
        assert_eq!(parse_page_file_name("page-x.html"), None);
    }
}
