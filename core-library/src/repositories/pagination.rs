//! Offset pagination for playlist, track and release listings

use serde::{Deserialize, Serialize};

/// Largest page a caller may request
pub const MAX_PAGE_SIZE: u32 = 500;

const DEFAULT_PAGE_SIZE: u32 = 50;

/// Zero-based page of `page_size` rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Page size is clamped to `1..=MAX_PAGE_SIZE`
    ///
    /// ```
    /// use core_library::repositories::PageRequest;
    ///
    /// let request = PageRequest::new(2, 20);
    /// assert_eq!(request.offset(), 40);
    /// assert_eq!(PageRequest::new(0, 0).limit(), 1);
    /// ```
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * self.limit()
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size.clamp(1, MAX_PAGE_SIZE))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// Rows of one page plus the unpaged row count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            request,
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.request.limit() as u64)
    }

    /// Request for the following page, if any rows remain
    pub fn next_request(&self) -> Option<PageRequest> {
        let consumed = (self.request.offset() + self.request.limit()) as u64;
        (consumed < self.total)
            .then(|| PageRequest::new(self.request.page + 1, self.request.page_size))
    }

    pub fn has_next(&self) -> bool {
        self.next_request().is_some()
    }
}
