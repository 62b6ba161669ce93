use std::ops::Range;

/// Page window for a row index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDetails {
    pub num_pages: usize,
    /// Zero-based
    pub current_page: usize,
    /// First row on the page
    pub start: usize,
    /// Last row on the page (inclusive); equals `start` when there are no rows
    pub end: usize,
    len: usize,
}

impl PageDetails {
    /// Indices of the rows on the page
    pub fn rows(&self) -> Range<usize> {
        self.start..self.start + self.len
    }

    /// Number of rows on the page
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Compute the page that contains `current`
///
/// `page_size` is treated as at least 1.
pub fn paginate(total: usize, page_size: usize, current: usize) -> PageDetails {
    let page_size = page_size.max(1);
    let num_pages = total.div_ceil(page_size);
    let start = (current / page_size) * page_size;
    let last = (start + page_size).min(total);
    let len = last.saturating_sub(start);
    let end = if len == 0 { start } else { last - 1 };
    let current_page = start.div_ceil(page_size);

    PageDetails {
        num_pages,
        current_page,
        start,
        end,
        len,
    }
}

/// Row cursor of the summary table and the page window around it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    total: usize,
    page_size: usize,
    selected: usize,
    page: PageDetails,
}

impl Pager {
    /// Create a pager over `total` rows, selecting the first
    pub fn new(total: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            total,
            page_size,
            selected: 0,
            page: paginate(total, page_size, 0),
        }
    }

    /// Get selected row index
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Get current page window
    pub fn page(&self) -> PageDetails {
        self.page
    }

    /// Get rows per page
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Get total row count
    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether the first row is selected
    pub fn is_first(&self) -> bool {
        self.selected == 0
    }

    /// Whether the last row is selected
    pub fn is_last(&self) -> bool {
        self.selected + 1 >= self.total
    }

    fn repage(&mut self) {
        self.page = paginate(self.total, self.page_size, self.selected);
    }

    /// Move the cursor to the previous row
    pub fn line_up(&mut self) -> bool {
        if self.selected == 0 {
            return false;
        }
        self.selected -= 1;
        if self.selected < self.page.start {
            self.repage();
        }
        true
    }

    /// Move the cursor to the next row
    pub fn line_down(&mut self) -> bool {
        if self.selected + 1 >= self.total {
            return false;
        }
        self.selected += 1;
        if self.selected > self.page.end {
            self.repage();
        }
        true
    }

    /// Jump to the first row of the previous page
    pub fn page_up(&mut self) -> bool {
        if self.page.start < self.page_size {
            return false;
        }
        self.selected = self.page.start - self.page_size;
        self.repage();
        true
    }

    /// Jump to the first row of the next page
    pub fn page_down(&mut self) -> bool {
        if self.page.end + 1 >= self.total {
            return false;
        }
        self.selected = self.page.end + 1;
        self.repage();
        true
    }

    /// Put the cursor on `index`, moving the page window with it
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.total || index == self.selected {
            return false;
        }
        self.selected = index;
        self.repage();
        true
    }
}
