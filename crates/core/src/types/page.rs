//! Pagination.

use serde::{Deserialize, Serialize};

/// A zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page_index: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Create a page request; a zero page size is bumped to one.
    #[must_use]
    pub fn new(page_index: u32, page_size: u32) -> Self {
        Self {
            page_index,
            page_size: page_size.max(1),
        }
    }

    /// Number of records to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page_index as u64 * self.page_size as u64
    }
}

/// One page of results plus the total number of matching records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub request: PageRequest,
    pub total: u64,
}

impl<T> Page<T> {
    /// Cut a page out of an already filtered and ordered result set.
    #[must_use]
    pub fn slice(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let skip = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let items = all
            .into_iter()
            .skip(skip)
            .take(request.page_size as usize)
            .collect();
        Self {
            items,
            request,
            total,
        }
    }

    /// Transform the items, keeping the paging information.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            request: self.request,
            total: self.total,
        }
    }
}
