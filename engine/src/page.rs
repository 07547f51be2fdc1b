//! Pagination of ordered results.

use crate::{error::Result, Error};
use serde::{Deserialize, Serialize};

/// Number of tasks shown per page: 10, 20 or 50.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PageSize(u32);

impl PageSize {
    /// Sizes a view may use.
    pub const ALLOWED: [u32; 3] = [10, 20, 50];

    /// Validate a page size.
    pub fn new(size: u32) -> Result<Self> {
        if Self::ALLOWED.contains(&size) {
            Ok(Self(size))
        } else {
            Err(Error::InvalidPageSize(size))
        }
    }

    /// The size as a number.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(10)
    }
}

impl TryFrom<u32> for PageSize {
    type Error = Error;

    fn try_from(size: u32) -> Result<Self> {
        Self::new(size)
    }
}

impl From<PageSize> for u32 {
    fn from(size: PageSize) -> Self {
        size.0
    }
}

/// Which page of the filtered, sorted tasks is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    /// 1-based page number; never clamped to the page count
    pub current_page: u32,
    pub page_size: PageSize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            current_page: 1,
            page_size: PageSize::default(),
        }
    }
}

impl ViewState {
    /// Go to `page`. Pages start at 1.
    pub fn set_page(&mut self, page: u32) -> Result<()> {
        if page == 0 {
            return Err(Error::InvalidPage(page));
        }
        self.current_page = page;
        Ok(())
    }

    /// Change the page size and return to the first page.
    pub fn set_page_size(&mut self, size: u32) -> Result<()> {
        self.page_size = PageSize::new(size)?;
        self.current_page = 1;
        Ok(())
    }

    /// Return to the first page.
    pub fn reset_page(&mut self) {
        self.current_page = 1;
    }
}

/// Number of pages needed for `count` items; `0` when there are none.
pub fn total_pages(count: usize, size: PageSize) -> u32 {
    count.div_ceil(size.get() as usize) as u32
}

/// The slice of `items` on `page` (1-based).
///
/// Pages past the end, and page 0, yield an empty slice.
pub fn paginate<T>(items: &[T], page: u32, size: PageSize) -> &[T] {
    if page == 0 {
        return &[];
    }
    let size = size.get() as usize;
    let start = (page as usize - 1).saturating_mul(size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(size).min(items.len());
    &items[start..end]
}
