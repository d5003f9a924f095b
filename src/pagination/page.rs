//! Page request validation and page result assembly

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cursor::{decode_cursor, encode_cursor};
use crate::error::QueryGenError;

/// Page size used when the request leaves `limit` at zero
pub const DEFAULT_PAGE_LIMIT: u32 = 20;
/// Largest accepted page size
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Incoming page request (`cursor`, `limit`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub limit: i64,
}

/// A validated request: decoded lower bound plus effective page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Exclusive lower bound on the identifier
    pub after: Option<Uuid>,
    pub limit: u32,
}

impl PaginationParams {
    pub fn new(cursor: Option<String>, limit: i64) -> Self {
        Self { cursor, limit }
    }

    /// Check bounds and decode the cursor
    pub fn validate(&self) -> Result<PageRequest, QueryGenError> {
        if self.limit < 0 {
            return Err(QueryGenError::pagination(format!(
                "limit must not be negative, got {}",
                self.limit
            )));
        }
        if self.limit > i64::from(MAX_PAGE_LIMIT) {
            return Err(QueryGenError::pagination(format!(
                "limit must be at most {}, got {}",
                MAX_PAGE_LIMIT, self.limit
            )));
        }

        let limit = match self.limit {
            0 => DEFAULT_PAGE_LIMIT,
            n => n as u32,
        };
        let after = decode_cursor(self.cursor.as_deref().unwrap_or(""))?;

        Ok(PageRequest { after, limit })
    }
}

impl PageRequest {
    /// Rows to request: one extra row reveals whether another page exists
    pub fn fetch_limit(&self) -> i64 {
        i64::from(self.limit) + 1
    }
}

/// Response envelope (`items`, `has_more`, `next_cursor`, `total`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationResult<T> {
    pub items: Vec<T>,
    pub has_more: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    /// Never computed by the engine; generated code may fill it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
}

impl<T> PaginationResult<T> {
    /// Build a page from up to `limit + 1` rows fetched in identifier order
    pub fn from_rows<F>(mut rows: Vec<T>, limit: u32, id_of: F) -> Self
    where
        F: Fn(&T) -> Uuid,
    {
        let limit = limit as usize;
        let has_more = rows.len() > limit;
        if has_more {
            rows.truncate(limit);
        }

        let next_cursor = if has_more {
            rows.last().map(|row| encode_cursor(&id_of(row)))
        } else {
            None
        };

        Self {
            items: rows,
            has_more,
            next_cursor,
            total: None,
        }
    }
}
