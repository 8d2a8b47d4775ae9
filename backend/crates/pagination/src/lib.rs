//! Page/limit pagination primitives shared by storefront list endpoints.
//!
//! [`PageRequest`] validates the `page` and `limit` query parameters and
//! exposes the matching row offset. [`Page`] is the JSON envelope returned by
//! every paged endpoint:
//!
//! ```json
//! { "items": [], "page": 1, "limit": 10, "totalItems": 0, "totalPages": 0 }
//! ```

use serde::{Deserialize, Serialize};

/// Page size used when the client omits `limit`.
pub const DEFAULT_LIMIT: u32 = 10;

/// Largest page size a client may request.
pub const MAX_LIMIT: u32 = 100;

/// Errors raised while validating pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// `page` was zero.
    #[error("page must be at least 1")]
    InvalidPage,
    /// `limit` was zero or above [`MAX_LIMIT`].
    #[error("limit must be between 1 and {max}")]
    InvalidLimit {
        /// Upper bound accepted for `limit`.
        max: u32,
    },
}

/// Validated one-based page number and page size.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::from_query(Some(3), Some(20))?;
/// assert_eq!(request.offset(), 40);
/// # Ok::<(), pagination::PaginationError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Validate explicit page and limit values.
    ///
    /// # Errors
    /// Returns [`PaginationError`] when `page` is zero or `limit` falls
    /// outside `1..=MAX_LIMIT`.
    pub const fn new(page: u32, limit: u32) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::InvalidPage);
        }
        if limit == 0 || limit > MAX_LIMIT {
            return Err(PaginationError::InvalidLimit { max: MAX_LIMIT });
        }
        Ok(Self { page, limit })
    }

    /// Build a request from optional query parameters, applying defaults.
    ///
    /// # Errors
    /// Propagates validation failures from [`PageRequest::new`].
    pub const fn from_query(page: Option<u32>, limit: Option<u32>) -> Result<Self, PaginationError> {
        let resolved_page = match page {
            Some(value) => value,
            None => 1,
        };
        let resolved_limit = match limit {
            Some(value) => value,
            None => DEFAULT_LIMIT,
        };
        Self::new(resolved_page, resolved_limit)
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn limit(self) -> u32 {
        self.limit
    }

    /// Number of items preceding this page.
    #[must_use]
    pub fn offset(self) -> u64 {
        u64::from(self.page.saturating_sub(1)).saturating_mul(u64::from(self.limit))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One page of results plus the totals needed to render pagination controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// One-based page number.
    pub page: u32,
    /// Requested page size.
    pub limit: u32,
    /// Total number of matching items across all pages.
    pub total_items: u64,
    /// Number of pages needed to show every item.
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Wrap items already fetched for `request`.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            page: request.page(),
            limit: request.limit(),
            total_items,
            total_pages: total_items.div_ceil(u64::from(request.limit())),
        }
    }

    /// Slice an in-memory collection into the requested page.
    #[must_use]
    pub fn from_all(all: Vec<T>, request: PageRequest) -> Self {
        let total_items = u64::try_from(all.len()).unwrap_or(u64::MAX);
        let skip = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(request.limit()).unwrap_or(usize::MAX);
        let items = all.into_iter().skip(skip).take(take).collect();
        Self::new(items, request, total_items)
    }

    /// Transform every item while keeping the totals.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}
