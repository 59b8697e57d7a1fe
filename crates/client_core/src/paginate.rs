//! Page arithmetic for collection tables. Pages are 1-based.

use std::ops::RangeInclusive;

/// `ceil(total_items / page_size)`, never less than 1 so an empty table still
/// has a current page.
pub fn total_pages(total_items: u64, page_size: u32) -> u32 {
    let page_size = u64::from(page_size.max(1));
    let pages = total_items.div_ceil(page_size).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// `items[(page_index - 1) * page_size .. page_index * page_size]`, clamped to
/// the slice bounds. Page 0 is empty.
pub fn slice<T>(items: &[T], page_index: u32, page_size: u32) -> &[T] {
    if page_index == 0 || page_size == 0 {
        return &[];
    }
    let page_size = page_size as usize;
    let start = (page_index as usize - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_index: u32,
    page_size: u32,
    total_count: u64,
}

impl Paginator {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_index: 1,
            page_size: page_size.max(1),
            total_count: 0,
        }
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.total_count, self.page_size)
    }

    pub fn contains(&self, page: u32) -> bool {
        (1..=self.total_pages()).contains(&page)
    }

    /// Moves to `page` when it is in range. Out-of-range requests are ignored.
    pub fn set_page(&mut self, page: u32) -> bool {
        if !self.contains(page) {
            return false;
        }
        self.page_index = page;
        true
    }

    /// Records a new total and pulls the page index back in range if the
    /// collection shrank. Returns whether the index moved.
    pub fn set_total_count(&mut self, total_count: u64) -> bool {
        self.total_count = total_count;
        let last = self.total_pages();
        if self.page_index > last {
            self.page_index = last;
            return true;
        }
        false
    }

    pub fn has_previous(&self) -> bool {
        self.page_index > 1
    }

    pub fn has_next(&self) -> bool {
        self.page_index < self.total_pages()
    }

    /// Numbers for a page-button strip.
    pub fn page_numbers(&self) -> RangeInclusive<u32> {
        1..=self.total_pages()
    }
}

#[cfg(test)]
#[path = "tests/paginate_tests.rs"]
mod tests;
