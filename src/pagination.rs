//! # Pagination — Fixed-Size Page Slicing
//!
//! Cuts an already-ordered collection into contiguous pages. Concatenating
//! pages `1..=total_pages` reproduces the input exactly, with nothing dropped
//! or duplicated.
//!
//! The engine never clamps the requested page: a page past the end is an
//! empty slice, not an error. Keeping navigation within `1..=total_pages` is
//! the caller's job (see [`crate::session::DashboardSession`]).

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Rows per page in the project table.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Requested page (1-based) and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPageSpec")]
pub struct PageSpec {
    page_number: usize,
    page_size: usize,
}

impl PageSpec {
    /// Both values must be at least 1.
    pub fn new(page_number: usize, page_size: usize) -> Result<Self> {
        if page_number == 0 {
            anyhow::bail!("page number must be at least 1");
        }
        if page_size == 0 {
            anyhow::bail!("page size must be at least 1");
        }
        Ok(PageSpec {
            page_number,
            page_size,
        })
    }

    /// First page with the given size.
    pub fn first(page_size: usize) -> Result<Self> {
        PageSpec::new(1, page_size)
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Same size, different page. Zero is lifted to page 1.
    pub fn with_page(self, page_number: usize) -> Self {
        PageSpec {
            page_number: page_number.max(1),
            ..self
        }
    }

    /// Index of the first row on this page (0-based).
    pub fn start_index(&self) -> usize {
        self.page_number.saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// Unchecked wire form; deserialization goes through [`PageSpec::new`].
#[derive(Deserialize)]
struct RawPageSpec {
    page_number: usize,
    page_size: usize,
}

impl TryFrom<RawPageSpec> for PageSpec {
    type Error = anyhow::Error;

    fn try_from(raw: RawPageSpec) -> Result<Self> {
        PageSpec::new(raw.page_number, raw.page_size)
    }
}

impl Default for PageSpec {
    fn default() -> Self {
        PageSpec {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Number of pages needed for `total_items`; zero for an empty collection.
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

/// One page of an ordered collection plus the metadata the table footer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page_number: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub start_index: usize,
}

impl<T> Page<'_, T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 1-based position of the first row shown, or 0 when the page is empty.
    pub fn first_shown(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            self.start_index + 1
        }
    }

    /// 1-based position of the last row shown, or 0 when the page is empty.
    pub fn last_shown(&self) -> usize {
        self.start_index + self.items.len()
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages
    }
}

/// Slice `ordered` according to `spec`. Out-of-range pages yield an empty slice.
pub fn paginate<T>(ordered: &[T], spec: PageSpec) -> Page<'_, T> {
    let total_items = ordered.len();
    let start_index = spec.start_index();
    let items = if start_index >= total_items {
        &ordered[total_items..]
    } else {
        let end = start_index.saturating_add(spec.page_size).min(total_items);
        &ordered[start_index..end]
    };
    Page {
        items,
        page_number: spec.page_number,
        page_size: spec.page_size,
        total_pages: total_pages(total_items, spec.page_size),
        total_items,
        start_index,
    }
}
