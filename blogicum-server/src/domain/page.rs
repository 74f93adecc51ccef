use std::num::IntErrorKind;

use serde::Serialize;

pub const POSTS_PER_PAGE: u64 = 10;

/// Resolves a requested page number against a result count.
///
/// Anything that is not a positive integer lands on the first page and numbers past the end
/// land on the last one, so a listing never fails because of its `?page=` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: u64,
}

/// The slice of a result set that a page covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub limit: u64,
    pub offset: u64,
}

impl Paginator {
    pub fn new(per_page: u64) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    /// An empty result set still has one (empty) page.
    pub fn num_pages(&self, count: u64) -> u64 {
        count.div_ceil(self.per_page).max(1)
    }

    pub fn window(&self, requested: Option<&str>, count: u64) -> PageWindow {
        let num_pages = self.num_pages(count);
        let number = match requested.map(str::trim).map(str::parse::<i64>) {
            Some(Ok(n)) if n > num_pages as i64 => num_pages,
            Some(Ok(n)) if n >= 1 => n as u64,
            Some(Err(e)) if *e.kind() == IntErrorKind::PosOverflow => num_pages,
            _ => 1,
        };
        PageWindow {
            number,
            num_pages,
            count,
            limit: self.per_page,
            offset: (number - 1) * self.per_page,
        }
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(POSTS_PER_PAGE)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<u64>,
    pub previous_page_number: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow) -> Self {
        let has_next = window.number < window.num_pages;
        let has_previous = window.number > 1;
        Self {
            items,
            number: window.number,
            num_pages: window.num_pages,
            count: window.count,
            has_next,
            has_previous,
            next_page_number: has_next.then_some(window.number + 1),
            previous_page_number: has_previous.then(|| window.number - 1),
        }
    }
}
