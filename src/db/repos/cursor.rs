//! Cursor-based pagination support for efficient, consistent pagination.
//!
//! Cursors encode a `(created_at, id)` position in an ordered result set as
//! a URL-safe base64 string. Keyset pagination over that pair gives:
//!
//! - **Performance**: O(1) seek on indexed columns vs O(n) for offsets
//! - **Consistency**: stable results even when rows are inserted or deleted
//!   between requests; consecutive pages never duplicate or skip a record
//!
//! Timestamps are Unix epoch seconds throughout (the wire and storage
//! resolution of this system), so the pair, not the timestamp alone,
//! is what makes the ordering unique.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for cursor operations.
#[derive(Debug, Error)]
pub enum CursorError {
    #[error("invalid cursor format")]
    InvalidFormat,
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid timestamp in cursor")]
    InvalidTimestamp,
    #[error("invalid UUID in cursor")]
    InvalidUuid,
}

/// A cursor for keyset pagination, encoding a position in an ordered result
/// set.
///
/// The cursor encodes both the `created_at` epoch-seconds timestamp and the
/// row `id` to provide a unique, stable ordering even when multiple records
/// share a timestamp (common at one-second resolution).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    /// The epoch-seconds timestamp component of the cursor position.
    pub created_at: i64,
    /// The UUID component of the cursor position.
    pub id: Uuid,
}

impl Cursor {
    /// Create a new cursor from a timestamp and ID.
    pub fn new(created_at: i64, id: Uuid) -> Self {
        Self { created_at, id }
    }

    /// Encode the cursor as a URL-safe base64 string.
    ///
    /// Format: `{epoch_seconds}:{uuid}` encoded as base64.
    pub fn encode(&self) -> String {
        let raw = format!("{}:{}", self.created_at, self.id);
        URL_SAFE_NO_PAD.encode(raw.as_bytes())
    }

    /// Decode a cursor from a base64 string.
    pub fn decode(encoded: &str) -> Result<Self, CursorError> {
        let bytes = URL_SAFE_NO_PAD.decode(encoded)?;
        let raw = String::from_utf8(bytes).map_err(|_| CursorError::InvalidFormat)?;

        // Format: {timestamp}:{uuid}
        // UUIDs use hyphens not colons, so ':' cleanly separates the two parts.
        let (timestamp_str, uuid_str) = raw.split_once(':').ok_or(CursorError::InvalidFormat)?;

        let created_at: i64 = timestamp_str
            .parse()
            .map_err(|_| CursorError::InvalidTimestamp)?;

        let id = Uuid::parse_str(uuid_str).map_err(|_| CursorError::InvalidUuid)?;

        Ok(Self { created_at, id })
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl Serialize for Cursor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Cursor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Cursor::decode(&s).map_err(serde::de::Error::custom)
    }
}

/// Direction for cursor-based pagination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorDirection {
    /// Fetch items after the cursor (`after` in the OpenAI list contract).
    #[default]
    Forward,
    /// Fetch items before the cursor (`before` in the OpenAI list contract).
    Backward,
}

/// Cursors for navigating paginated results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageCursors {
    /// Cursor for the next page (if more items exist).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Cursor>,
    /// Cursor for the previous page (if not on first page).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<Cursor>,
}

impl PageCursors {
    /// Create cursors from a list of items.
    ///
    /// Items are expected to be in the order they will be returned to the
    /// caller (typically descending by created_at).
    ///
    /// # Arguments
    /// * `items` - The items returned for this page
    /// * `has_more` - Whether there are more items after this page
    /// * `direction` - The direction of pagination
    /// * `cursor` - The cursor used for this request (if any)
    /// * `get_cursor` - Function to extract cursor components from an item
    pub fn from_items<T, F>(
        items: &[T],
        has_more: bool,
        direction: CursorDirection,
        cursor: Option<&Cursor>,
        get_cursor: F,
    ) -> Self
    where
        F: Fn(&T) -> Cursor,
    {
        if items.is_empty() {
            return Self::default();
        }

        let first = get_cursor(&items[0]);
        let last = get_cursor(&items[items.len() - 1]);

        match direction {
            CursorDirection::Forward => Self {
                // Next cursor: position of last item if there are more
                next: if has_more { Some(last) } else { None },
                // Prev cursor: position of first item if we're not on the first page
                prev: cursor.map(|_| first),
            },
            CursorDirection::Backward => Self {
                // When going backward, next is the first item's position
                next: cursor.map(|_| first),
                // Prev is the last item's position if there are more
                prev: if has_more { Some(last) } else { None },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_encode_decode_roundtrip() {
        let cursor = Cursor::new(1_700_000_000, Uuid::new_v4());

        let encoded = cursor.encode();
        let decoded = Cursor::decode(&encoded).unwrap();

        assert_eq!(cursor, decoded);
    }

    #[test]
    fn test_cursor_encode_is_url_safe() {
        let cursor = Cursor::new(1_700_000_000, Uuid::new_v4());
        let encoded = cursor.encode();

        // URL-safe base64 should only contain alphanumeric, dash, underscore
        assert!(
            encoded
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_cursor_decode_invalid_base64() {
        let result = Cursor::decode("not valid base64!!!");
        assert!(matches!(result, Err(CursorError::Base64(_))));
    }

    #[test]
    fn test_cursor_decode_invalid_format() {
        // Valid base64 but missing colon separator
        let encoded = URL_SAFE_NO_PAD.encode(b"invalid_format");
        let result = Cursor::decode(&encoded);
        assert!(matches!(result, Err(CursorError::InvalidFormat)));
    }

    #[test]
    fn test_cursor_decode_invalid_timestamp() {
        // Valid format but non-numeric timestamp
        let encoded = URL_SAFE_NO_PAD.encode(b"not_a_number:00000000-0000-0000-0000-000000000000");
        let result = Cursor::decode(&encoded);
        assert!(matches!(result, Err(CursorError::InvalidTimestamp)));
    }

    #[test]
    fn test_cursor_decode_invalid_uuid() {
        // Valid format but invalid UUID
        let encoded = URL_SAFE_NO_PAD.encode(b"1234567890:not-a-uuid");
        let result = Cursor::decode(&encoded);
        assert!(matches!(result, Err(CursorError::InvalidUuid)));
    }

    #[test]
    fn test_cursor_serde_roundtrip() {
        let cursor = Cursor::new(1_700_000_000, Uuid::new_v4());
        let json = serde_json::to_string(&cursor).unwrap();
        let decoded: Cursor = serde_json::from_str(&json).unwrap();

        assert_eq!(cursor, decoded);
    }

    #[test]
    fn test_cursor_direction_default() {
        assert_eq!(CursorDirection::default(), CursorDirection::Forward);
    }

    #[test]
    fn test_cursor_direction_serde() {
        let forward: CursorDirection = serde_json::from_str("\"forward\"").unwrap();
        let backward: CursorDirection = serde_json::from_str("\"backward\"").unwrap();

        assert_eq!(forward, CursorDirection::Forward);
        assert_eq!(backward, CursorDirection::Backward);
    }

    #[test]
    fn test_page_cursors_empty_items() {
        let cursors = PageCursors::from_items::<(), _>(
            &[],
            false,
            CursorDirection::Forward,
            None,
            |_| unreachable!(),
        );
        assert!(cursors.next.is_none());
        assert!(cursors.prev.is_none());
    }

    #[test]
    fn test_page_cursors_first_page_with_more() {
        let items = vec![(1_700_000_000_i64, Uuid::new_v4()), (1_700_000_001, Uuid::new_v4())];

        let cursors = PageCursors::from_items(
            &items,
            true, // has_more
            CursorDirection::Forward,
            None, // no cursor = first page
            |(created_at, id)| Cursor::new(*created_at, *id),
        );

        // First page with more items: next cursor, no prev cursor
        assert!(cursors.next.is_some());
        assert!(cursors.prev.is_none());
    }

    #[test]
    fn test_page_cursors_middle_page() {
        let items = vec![(1_700_000_000_i64, Uuid::new_v4()), (1_700_000_001, Uuid::new_v4())];
        let prev_cursor = Cursor::new(1_699_999_999, Uuid::new_v4());

        let cursors = PageCursors::from_items(
            &items,
            true, // has_more
            CursorDirection::Forward,
            Some(&prev_cursor),
            |(created_at, id)| Cursor::new(*created_at, *id),
        );

        // Middle page: both next and prev cursors
        assert!(cursors.next.is_some());
        assert!(cursors.prev.is_some());
    }

    #[test]
    fn test_page_cursors_last_page() {
        let items = vec![(1_700_000_000_i64, Uuid::new_v4()), (1_700_000_001, Uuid::new_v4())];
        let prev_cursor = Cursor::new(1_699_999_999, Uuid::new_v4());

        let cursors = PageCursors::from_items(
            &items,
            false, // no more items
            CursorDirection::Forward,
            Some(&prev_cursor),
            |(created_at, id)| Cursor::new(*created_at, *id),
        );

        // Last page: no next cursor, has prev cursor
        assert!(cursors.next.is_none());
        assert!(cursors.prev.is_some());
    }
}
