//! Cursor pagination parameters
//!
//! `?limit=25&next_cursor=abc` asks for up to 25 items after the opaque
//! cursor `abc`. The cursor belongs to the storage layer and is passed
//! through untouched.
//!
//! # Example
//!
//! ```rust
//! use http_binder::{parse_pagination, QueryParams, MAX_LIMIT};
//!
//! let page = parse_pagination(&QueryParams::parse("limit=5000&next_cursor=opaque")).unwrap();
//! assert_eq!(page.limit, MAX_LIMIT);
//! assert_eq!(page.cursor, "opaque");
//! ```

use serde::{Deserialize, Serialize};

use crate::capability::QueryParamBinder;
use crate::error::HttpError;
use crate::query::QueryParams;

/// Default number of items per page
pub const DEFAULT_LIMIT: u32 = 10;

/// Maximum allowed items per page; larger requests are clamped silently
pub const MAX_LIMIT: u32 = 1000;

/// Query key for the page size
pub const LIMIT_PARAM: &str = "limit";

/// Query key for the continuation cursor
pub const CURSOR_PARAM: &str = "next_cursor";

/// Page size and continuation cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationParams {
    /// Items per page, always within `1..=MAX_LIMIT`
    pub limit: u32,
    /// Opaque continuation token; empty for the first page
    pub cursor: String,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            cursor: String::new(),
        }
    }
}

impl PaginationParams {
    /// Whether this is a request for the first page
    #[must_use]
    pub fn is_first_page(&self) -> bool {
        self.cursor.is_empty()
    }
}

/// Parse `limit` and `next_cursor` with defaulting and clamping
///
/// An empty `limit` is treated as absent. Anything that is not a base-10
/// integer greater than zero is a 400.
pub fn parse_pagination(params: &QueryParams) -> Result<PaginationParams, HttpError> {
    let mut page = PaginationParams::default();

    if let Some(raw) = params.get_non_empty(LIMIT_PARAM) {
        let limit = raw
            .parse::<i64>()
            .ok()
            .filter(|limit| *limit > 0)
            .ok_or_else(|| HttpError::bad_request("limit must be a positive integer"))?;
        page.limit = u32::try_from(limit.min(i64::from(MAX_LIMIT))).unwrap_or(MAX_LIMIT);
    }

    if let Some(cursor) = params.get(CURSOR_PARAM) {
        page.cursor = cursor.to_string();
    }

    Ok(page)
}

/// A page of items, doubling as a pagination bundle for list requests
///
/// As a request field it binds `limit` / `next_cursor`; as a response it
/// serializes as `{"limit": .., "next_cursor": .., "items": [..]}` with the
/// cursor omitted when empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedList<T> {
    /// Items per page
    pub limit: u32,
    /// Cursor for the next page; empty when there is none
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub next_cursor: String,
    /// Items in this page
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> Default for PaginatedList<T> {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            next_cursor: String::new(),
            items: Vec::new(),
        }
    }
}

impl<T> PaginatedList<T> {
    /// Build a page of results
    pub fn new(items: Vec<T>, limit: u32, next_cursor: impl Into<String>) -> Self {
        Self {
            limit,
            next_cursor: next_cursor.into(),
            items,
        }
    }

    /// The bound request parameters
    #[must_use]
    pub fn params(&self) -> PaginationParams {
        PaginationParams {
            limit: self.limit,
            cursor: self.next_cursor.clone(),
        }
    }

    /// Whether another page follows
    #[must_use]
    pub fn has_more(&self) -> bool {
        !self.next_cursor.is_empty()
    }

    /// Map the items to a new type, keeping limit and cursor
    pub fn map<U, F>(self, f: F) -> PaginatedList<U>
    where
        F: FnMut(T) -> U,
    {
        PaginatedList {
            limit: self.limit,
            next_cursor: self.next_cursor,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

impl<T> QueryParamBinder for PaginatedList<T> {
    fn bind_query_params(&mut self, params: &QueryParams) -> Result<(), HttpError> {
        let page = parse_pagination(params)?;
        self.limit = page.limit;
        self.next_cursor = page.cursor;
        Ok(())
    }
}
