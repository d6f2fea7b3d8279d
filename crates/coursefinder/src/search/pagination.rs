//! Page slicing for result tables.

use serde::Serialize;

/// Results per page when none is configured
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// One page of a result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// 1-based page number
    pub number: usize,
    pub num_pages: usize,
    /// Total items across all pages
    pub total: usize,
    pub page_size: usize,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Cuts the requested page out of `items`.
    ///
    /// A missing or non-numeric page number gives the first page; zero or a
    /// number past the end gives the last page. An empty list still has one
    /// (empty) page.
    pub fn paginate(items: Vec<T>, requested: Option<&str>, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let total = items.len();
        let num_pages = total.div_ceil(page_size).max(1);

        let number = match requested.map(str::trim).map(str::parse::<usize>) {
            None | Some(Err(_)) => 1,
            Some(Ok(n)) if n == 0 || n > num_pages => num_pages,
            Some(Ok(n)) => n,
        };

        let start = (number - 1) * page_size;
        let items = items.into_iter().skip(start).take(page_size).collect();

        Self {
            number,
            num_pages,
            total,
            page_size,
            items,
        }
    }

    /// 1-based index of the first item on this page, 0 when there are none.
    pub fn start_index(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            (self.number - 1) * self.page_size + 1
        }
    }

    /// 1-based index of the last item on this page, 0 when there are none.
    pub fn end_index(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            (self.number - 1) * self.page_size + self.items.len()
        }
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn info(&self) -> PageInfo {
        PageInfo {
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
            start_index: self.start_index(),
            end_index: self.end_index(),
            has_next: self.has_next(),
            has_previous: self.has_previous(),
        }
    }
}

/// Page position, without the items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub number: usize,
    pub num_pages: usize,
    pub total: usize,
    pub start_index: usize,
    pub end_index: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(n: usize) -> Vec<usize> {
        (1..=n).collect()
    }

    #[test]
    fn test_middle_page() {
        let page = Page::paginate(numbers(120), Some("2"), 50);
        assert_eq!(page.number, 2);
        assert_eq!(page.num_pages, 3);
        assert_eq!(page.items.first(), Some(&51));
        assert_eq!(page.start_index(), 51);
        assert_eq!(page.end_index(), 100);
        assert!(page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn test_bad_page_numbers() {
        assert_eq!(Page::paginate(numbers(120), Some("abc"), 50).number, 1);
        assert_eq!(Page::paginate(numbers(120), None, 50).number, 1);

        let last = Page::paginate(numbers(120), Some("9"), 50);
        assert_eq!(last.number, 3);
        assert_eq!(last.items.len(), 20);
        assert_eq!(last.end_index(), 120);
        assert!(!last.has_next());

        assert_eq!(Page::paginate(numbers(120), Some("0"), 50).number, 3);
    }

    #[test]
    fn test_empty_list_has_one_page() {
        let page = Page::paginate(Vec::<usize>::new(), Some("4"), 50);
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert_eq!(page.end_index(), 0);
        assert!(page.items.is_empty());
    }
}
