use uuid::Uuid;

use crate::db::error::{DbError, DbResult};

/// Parse a UUID string from the database, returning a DbError on failure
pub fn parse_uuid(s: &str) -> DbResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| DbError::Internal(format!("Invalid UUID in database: {}", e)))
}

/// Current time as Unix epoch seconds, the storage and wire resolution of
/// every timestamp in this system.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Serialize optional opaque metadata to its JSON text column form.
pub fn meta_to_json(meta: &Option<serde_json::Value>) -> DbResult<Option<String>> {
    meta.as_ref()
        .map(|m| serde_json::to_string(m).map_err(DbError::from))
        .transpose()
}

/// Parse optional opaque metadata from its JSON text column form.
pub fn meta_from_json(json_str: Option<String>) -> DbResult<Option<serde_json::Value>> {
    match json_str {
        Some(s) => serde_json::from_str(&s).map_err(|e| DbError::Internal(e.to_string())),
        None => Ok(None),
    }
}
