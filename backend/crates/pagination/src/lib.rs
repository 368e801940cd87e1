//! Offset pagination primitives shared by listing endpoints.
//!
//! A [`PageWindow`] describes which slice of a collection a caller asked for,
//! either as a raw `limit`/`offset` pair or as a zero-based page index. The
//! [`Paginated`] envelope wraps the slice together with the counters clients
//! use to render paging controls.
//!
//! A limit of zero means "unbounded": the window covers every item after the
//! offset.
//!
//! # Examples
//! ```
//! use pagination::{PageWindow, Paginated};
//!
//! let window = PageWindow::from_offset(10, 20).expect("limit within bounds");
//! let page = Paginated::new(vec!["a", "b"], 22, window);
//! assert_eq!(page.item_count, 10);
//! assert_eq!(page.items_per_page, 2);
//! ```

use serde::{Deserialize, Serialize};

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Errors raised while building a [`PageWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageWindowError {
    /// The requested limit exceeds [`MAX_PAGE_SIZE`].
    #[error("limit must be at most {max}, got {limit}")]
    LimitTooLarge {
        /// Requested limit.
        limit: u32,
        /// Maximum accepted limit.
        max: u32,
    },
}

/// Requested slice of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageWindow {
    limit: u32,
    offset: u64,
    current_page: u64,
}

impl PageWindow {
    /// Build a window from a raw `limit`/`offset` pair.
    ///
    /// The reported current page is the offset itself, matching how offset
    /// based listings have always been rendered by clients.
    ///
    /// # Errors
    ///
    /// Returns [`PageWindowError::LimitTooLarge`] when `limit` exceeds
    /// [`MAX_PAGE_SIZE`].
    pub const fn from_offset(limit: u32, offset: u64) -> Result<Self, PageWindowError> {
        match check_limit(limit) {
            Ok(()) => Ok(Self {
                limit,
                offset,
                current_page: offset,
            }),
            Err(err) => Err(err),
        }
    }

    /// Build a window from a zero-based page index.
    ///
    /// The offset is `page * limit`; an unbounded limit always starts at the
    /// first item.
    ///
    /// # Errors
    ///
    /// Returns [`PageWindowError::LimitTooLarge`] when `limit` exceeds
    /// [`MAX_PAGE_SIZE`].
    ///
    /// # Examples
    /// ```
    /// use pagination::PageWindow;
    ///
    /// let window = PageWindow::from_page(25, 2).expect("limit within bounds");
    /// assert_eq!(window.offset(), 50);
    /// assert_eq!(window.current_page(), 2);
    /// ```
    pub const fn from_page(limit: u32, page: u32) -> Result<Self, PageWindowError> {
        match check_limit(limit) {
            Ok(()) => Ok(Self {
                limit,
                // u32 * u32 always fits in u64.
                offset: (page as u64) * (limit as u64),
                current_page: page as u64,
            }),
            Err(err) => Err(err),
        }
    }

    /// Window covering the whole collection.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            limit: 0,
            offset: 0,
            current_page: 0,
        }
    }

    /// Requested page size, or `None` when unbounded.
    #[must_use]
    pub const fn limit(&self) -> Option<u32> {
        if self.limit == 0 {
            None
        } else {
            Some(self.limit)
        }
    }

    /// Number of items skipped before the window starts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Page indicator echoed back to clients.
    #[must_use]
    pub const fn current_page(&self) -> u64 {
        self.current_page
    }
}

const fn check_limit(limit: u32) -> Result<(), PageWindowError> {
    if limit > MAX_PAGE_SIZE {
        Err(PageWindowError::LimitTooLarge {
            limit,
            max: MAX_PAGE_SIZE,
        })
    } else {
        Ok(())
    }
}

/// Pagination envelope returned by listing endpoints.
///
/// - `item_count` is the requested limit when one was supplied, otherwise the
///   number of items actually returned.
/// - `items_per_page` is the number of items the window can hold given the
///   total: `min(limit or total, total - offset)`, saturating at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    /// Items in this page.
    pub items: Vec<T>,
    /// Total number of items in the collection.
    pub total_items: u64,
    /// Requested page size, or the returned item count when unbounded.
    pub item_count: u64,
    /// Page indicator echoed from the request.
    pub current_page: u64,
    /// Items the requested window covers.
    pub items_per_page: u64,
}

impl<T> Paginated<T> {
    /// Wrap a fetched slice in a pagination envelope.
    #[must_use]
    pub fn new(items: Vec<T>, total_items: u64, window: PageWindow) -> Self {
        let returned = u64::try_from(items.len()).unwrap_or(u64::MAX);
        let remaining = total_items.saturating_sub(window.offset());
        let (item_count, items_per_page) = match window.limit() {
            Some(limit) => (u64::from(limit), u64::from(limit).min(remaining)),
            None => (returned, remaining),
        };
        Self {
            items,
            total_items,
            item_count,
            current_page: window.current_page(),
            items_per_page,
        }
    }

    /// Transform every item while keeping the counters intact.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Paginated<U>
    where
        F: FnMut(T) -> U,
    {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            item_count: self.item_count,
            current_page: self.current_page,
            items_per_page: self.items_per_page,
        }
    }
}
