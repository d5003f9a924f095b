//! Opaque cursor codec
//!
//! A cursor is the URL-safe base64 encoding of the 16 raw bytes of the last
//! identifier on a page. UUIDv7 values are time-ordered and byte-monotonic,
//! so `ORDER BY id` and byte order agree.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use uuid::Uuid;

use crate::error::QueryGenError;

/// Raw byte width of an identifier
pub const CURSOR_ID_LEN: usize = 16;

/// Encode an identifier as a cursor
pub fn encode_cursor(id: &Uuid) -> String {
    URL_SAFE.encode(id.as_bytes())
}

/// Decode a cursor; an empty cursor means "no lower bound"
pub fn decode_cursor(cursor: &str) -> Result<Option<Uuid>, QueryGenError> {
    if cursor.is_empty() {
        return Ok(None);
    }

    let bytes = URL_SAFE
        .decode(cursor)
        .map_err(|e| QueryGenError::pagination(format!("invalid cursor: {}", e)))?;

    let raw: [u8; CURSOR_ID_LEN] = bytes.as_slice().try_into().map_err(|_| {
        QueryGenError::pagination(format!(
            "invalid cursor: decoded to {} bytes, expected {}",
            bytes.len(),
            CURSOR_ID_LEN
        ))
    })?;

    Ok(Some(Uuid::from_bytes(raw)))
}
