//! Keyset pagination contract shared with generated code
//!
//! Pages are ordered by a UUIDv7 identifier. A request carries an opaque
//! cursor and a limit; the response carries the page, whether more rows
//! exist, and the cursor to continue from.

mod cursor;
mod page;
mod shape;

pub use cursor::{decode_cursor, encode_cursor, CURSOR_ID_LEN};
pub use page::{
    PageRequest, PaginationParams, PaginationResult, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
pub use shape::KeysetQuery;
