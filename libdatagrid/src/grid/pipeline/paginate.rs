use std::ops::Range;

/// Current page and page size. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub enabled: bool,
    current_page: usize,
    page_size: usize,
}

/// Derived page numbers for the footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub current_page: usize,
    pub page_size: usize,
    pub total: usize,
    /// `ceil(total / page_size)`, zero when there are no rows.
    pub total_pages: usize,
    /// 1-based index of the first row shown, zero when nothing is shown.
    pub start_entry: usize,
    pub end_entry: usize,
}

impl PageInfo {
    /// Page count used for navigation; page 1 exists even with no rows.
    #[must_use]
    pub fn display_pages(&self) -> usize {
        self.total_pages.max(1)
    }

    #[must_use]
    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.current_page < self.display_pages()
    }
}

/// Entry of the numbered page button strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageButton {
    Page(usize),
    Gap,
}

#[must_use]
pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

impl Pagination {
    #[must_use]
    pub fn new(page_size: usize, enabled: bool) -> Self {
        Self {
            enabled,
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    #[must_use]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Changing the page size always returns to page 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.current_page = 1;
    }

    /// Pages past the end are allowed and yield an empty slice.
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    pub fn prev(&mut self) {
        self.current_page = self.current_page.saturating_sub(1).max(1);
    }

    pub fn next(&mut self, total: usize) {
        let last = total_pages(total, self.page_size).max(1);
        self.current_page = self.current_page.saturating_add(1).min(last);
    }

    /// Slice bounds of the current page within `total` processed rows.
    #[must_use]
    pub fn page_range(&self, total: usize) -> Range<usize> {
        if !self.enabled {
            return 0..total;
        }
        let start = (self.current_page - 1)
            .saturating_mul(self.page_size)
            .min(total);
        let end = start.saturating_add(self.page_size).min(total);
        start..end
    }

    #[must_use]
    pub fn info(&self, total: usize) -> PageInfo {
        let end_entry = self.current_page.saturating_mul(self.page_size).min(total);
        let start_entry = if total == 0 {
            0
        } else {
            (self.current_page - 1)
                .saturating_mul(self.page_size)
                .saturating_add(1)
        };
        PageInfo {
            current_page: self.current_page,
            page_size: self.page_size,
            total,
            total_pages: total_pages(total, self.page_size),
            start_entry,
            end_entry,
        }
    }
}

/// Numbered buttons around the current page, always including the first
/// and last page, with gaps for skipped runs.
#[must_use]
pub fn page_buttons(current: usize, pages: usize, radius: usize) -> Vec<PageButton> {
    let pages = pages.max(1);
    let current = current.clamp(1, pages);
    let low = current.saturating_sub(radius).max(1);
    let high = (current + radius).min(pages);

    let mut buttons = Vec::new();
    if low > 1 {
        buttons.push(PageButton::Page(1));
        if low > 2 {
            buttons.push(PageButton::Gap);
        }
    }
    buttons.extend((low..=high).map(PageButton::Page));
    if high < pages {
        if high + 1 < pages {
            buttons.push(PageButton::Gap);
        }
        buttons.push(PageButton::Page(pages));
    }
    buttons
}
