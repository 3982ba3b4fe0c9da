use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Object type identifier for VectorStore resources (OpenAI API compatibility)
pub const OBJECT_TYPE_VECTOR_STORE: &str = "vector_store";
/// Object type identifier for VectorStoreFile resources (OpenAI API compatibility)
pub const OBJECT_TYPE_VECTOR_STORE_FILE: &str = "vector_store.file";

/// Expiration anchor used by the original service; the only value the API
/// ever produces.
pub const EXPIRES_ANCHOR_LAST_ACTIVE_AT: &str = "last_active_at";

/// Vector store status (OpenAI VectorStore compatible).
///
/// No processing pipeline exists in this system, so stores are created
/// `completed` and stay that way; the other variants exist for wire
/// compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VectorStoreStatus {
    InProgress,
    #[default]
    Completed,
    Expired,
}

impl VectorStoreStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VectorStoreStatus::InProgress => "in_progress",
            VectorStoreStatus::Completed => "completed",
            VectorStoreStatus::Expired => "expired",
        }
    }
}

impl std::str::FromStr for VectorStoreStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(VectorStoreStatus::InProgress),
            "completed" => Ok(VectorStoreStatus::Completed),
            "expired" => Ok(VectorStoreStatus::Expired),
            _ => Err(format!("Invalid vector store status: {}", s)),
        }
    }
}

/// File processing status within a vector store (OpenAI VectorStoreFile
/// compatible). Ingestion is a no-op here, so new memberships are recorded
/// `completed` immediately; `failed`/`cancelled` are reachable through
/// explicit status updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VectorStoreFileStatus {
    InProgress,
    #[default]
    Completed,
    Failed,
    Cancelled,
}

impl VectorStoreFileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VectorStoreFileStatus::InProgress => "in_progress",
            VectorStoreFileStatus::Completed => "completed",
            VectorStoreFileStatus::Failed => "failed",
            VectorStoreFileStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for VectorStoreFileStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(VectorStoreFileStatus::InProgress),
            "completed" => Ok(VectorStoreFileStatus::Completed),
            "failed" => Ok(VectorStoreFileStatus::Failed),
            "cancelled" => Ok(VectorStoreFileStatus::Cancelled),
            _ => Err(format!("Invalid vector store file status: {}", s)),
        }
    }
}

/// Aggregate membership tally for a vector store (OpenAI-compatible).
///
/// Counts are derived statistics: they are recalculated by SQL aggregation
/// over `vector_store_file` inside every membership-mutating transaction,
/// never incremented manually. `total` is always the sum of the other four.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCounts {
    pub in_progress: i64,
    pub completed: i64,
    pub failed: i64,
    pub cancelled: i64,
    pub total: i64,
}

impl FileCounts {
    /// Whether the `total = in_progress + completed + failed + cancelled`
    /// invariant holds.
    pub fn is_consistent(&self) -> bool {
        self.total == self.in_progress + self.completed + self.failed + self.cancelled
    }
}

/// Expiration policy for a vector store.
///
/// Stored flattened as `expires_after_anchor` + `expires_after_days`;
/// reconstructed only when `expires_after_days` is non-NULL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ExpiresAfter {
    /// Anchor timestamp the policy counts from ("last_active_at")
    pub anchor: String,
    #[validate(range(min = 1))]
    pub days: i64,
}

/// Error codes for file processing failures (OpenAI-compatible vocabulary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileErrorCode {
    InternalError,
    FileNotFound,
    ParsingError,
    UnhandledMimeType,
}

impl FileErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileErrorCode::InternalError => "internal_error",
            FileErrorCode::FileNotFound => "file_not_found",
            FileErrorCode::ParsingError => "parsing_error",
            FileErrorCode::UnhandledMimeType => "unhandled_mime_type",
        }
    }
}

impl std::str::FromStr for FileErrorCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "internal_error" => Ok(FileErrorCode::InternalError),
            "file_not_found" => Ok(FileErrorCode::FileNotFound),
            "parsing_error" => Ok(FileErrorCode::ParsingError),
            "unhandled_mime_type" => Ok(FileErrorCode::UnhandledMimeType),
            _ => Err(format!("Invalid file error code: {}", s)),
        }
    }
}

/// Last-error state of a vector store file (OpenAI-compatible).
///
/// Code and message travel together: the flattened columns are either both
/// set or both NULL, and the pair is reconstructed only when
/// `last_error_code` is non-NULL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    pub code: FileErrorCode,
    pub message: String,
}

/// Static chunking configuration (OpenAI-compatible)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticChunkingConfig {
    #[serde(default = "default_max_chunk_size_tokens")]
    pub max_chunk_size_tokens: i64,
    #[serde(default = "default_chunk_overlap_tokens")]
    pub chunk_overlap_tokens: i64,
}

impl Default for StaticChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size_tokens: default_max_chunk_size_tokens(),
            chunk_overlap_tokens: default_chunk_overlap_tokens(),
        }
    }
}

fn default_max_chunk_size_tokens() -> i64 {
    800
}

fn default_chunk_overlap_tokens() -> i64 {
    400
}

/// Chunking strategy for a vector store file.
///
/// Wire schema: `{"type": "static", "static": {...}}` or `{"type": "other"}`.
/// Requests may also send `{"type": "auto"}`, which collapses to `Other`;
/// both mean "default policy" and are stored under the `other` discriminator.
///
/// Stored flattened: `chunking_strategy_type` is the discriminator and is
/// always written; the two `chunking_strategy_static_*` columns are set for
/// the `static` variant and NULL otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChunkingStrategy {
    Static {
        #[serde(rename = "static")]
        config: StaticChunkingConfig,
    },
    #[default]
    #[serde(alias = "auto")]
    Other,
}

impl ChunkingStrategy {
    /// Discriminator value written to `chunking_strategy_type`.
    pub fn discriminator(&self) -> &'static str {
        match self {
            ChunkingStrategy::Static { .. } => "static",
            ChunkingStrategy::Other => "other",
        }
    }
}

/// A vector store (OpenAI VectorStore compatible).
///
/// Status and file counts are bookkeeping only; no chunking, embedding, or
/// search happens anywhere in this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStore {
    pub id: Uuid,
    /// Object type identifier (always "vector_store" for API compatibility)
    #[serde(default = "default_vector_store_object")]
    pub object: String,
    /// Creation time as Unix epoch seconds (OpenAI wire format)
    pub created_at: i64,
    pub last_active_at: i64,
    pub name: Option<String>,
    pub status: VectorStoreStatus,
    pub usage_bytes: i64,
    pub file_counts: FileCounts,
    #[serde(rename = "metadata")]
    pub meta: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_after: Option<ExpiresAfter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

fn default_vector_store_object() -> String {
    OBJECT_TYPE_VECTOR_STORE.to_string()
}

/// Request to create a new vector store.
///
/// The registry assigns id, timestamps, zeroed file counts, and `completed`
/// status; when an expiration policy is given, `expires_at` is computed from
/// the creation time.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateVectorStore {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(rename = "metadata")]
    pub meta: Option<serde_json::Value>,
    #[validate(nested)]
    pub expires_after: Option<ExpiresAfter>,
}

/// A file's membership in a vector store (OpenAI VectorStoreFile compatible).
///
/// The membership id is the Files API file id (matching OpenAI, where the
/// vector store file id equals the underlying file id); lookups are always
/// additionally scoped by `vector_store_id`. Membership is independent of
/// the file's registry lifecycle: deleting the file does not remove the
/// membership row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreFile {
    pub id: Uuid,
    /// Object type identifier (always "vector_store.file" for API compatibility)
    #[serde(default = "default_vector_store_file_object")]
    pub object: String,
    pub vector_store_id: Uuid,
    /// Creation time as Unix epoch seconds (OpenAI wire format)
    pub created_at: i64,
    pub status: VectorStoreFileStatus,
    pub usage_bytes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<FileError>,
    pub chunking_strategy: ChunkingStrategy,
    /// Original filename; stored but not part of the wire shape
    #[serde(skip)]
    pub filename: Option<String>,
    /// Opaque caller-supplied metadata; stored but not part of the wire shape
    #[serde(skip)]
    pub meta: Option<serde_json::Value>,
}

fn default_vector_store_file_object() -> String {
    OBJECT_TYPE_VECTOR_STORE_FILE.to_string()
}

/// Request to add a file to a vector store.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddVectorStoreFile {
    /// The file the membership is for; becomes the membership row id.
    pub file_id: Uuid,
    #[validate(length(max = 255))]
    pub filename: Option<String>,
    /// Defaults to the `other` strategy when absent (OpenAI: `auto`).
    pub chunking_strategy: Option<ChunkingStrategy>,
    /// Bytes attributed to this file within the store; rolls up into the
    /// parent's `usage_bytes`.
    #[serde(default)]
    pub usage_bytes: i64,
    #[serde(rename = "metadata")]
    pub meta: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunking_strategy_serde_round_trip() {
        let strategy = ChunkingStrategy::Static {
            config: StaticChunkingConfig {
                max_chunk_size_tokens: 800,
                chunk_overlap_tokens: 400,
            },
        };

        let json = serde_json::to_value(&strategy).unwrap();
        assert_eq!(json["type"], "static");
        assert_eq!(json["static"]["max_chunk_size_tokens"], 800);
        assert_eq!(json["static"]["chunk_overlap_tokens"], 400);

        let back: ChunkingStrategy = serde_json::from_value(json).unwrap();
        assert_eq!(back, strategy);
    }

    #[test]
    fn chunking_strategy_auto_is_alias_for_other() {
        let parsed: ChunkingStrategy = serde_json::from_str(r#"{"type": "auto"}"#).unwrap();
        assert_eq!(parsed, ChunkingStrategy::Other);
        assert_eq!(parsed.discriminator(), "other");

        let emitted = serde_json::to_value(&parsed).unwrap();
        assert_eq!(emitted, serde_json::json!({"type": "other"}));
    }

    #[test]
    fn chunking_strategy_static_defaults() {
        let parsed: ChunkingStrategy =
            serde_json::from_str(r#"{"type": "static", "static": {}}"#).unwrap();
        assert_eq!(
            parsed,
            ChunkingStrategy::Static {
                config: StaticChunkingConfig {
                    max_chunk_size_tokens: 800,
                    chunk_overlap_tokens: 400,
                }
            }
        );
    }

    #[test]
    fn file_counts_consistency() {
        let counts = FileCounts {
            in_progress: 1,
            completed: 2,
            failed: 3,
            cancelled: 4,
            total: 10,
        };
        assert!(counts.is_consistent());
        assert!(FileCounts::default().is_consistent());

        let broken = FileCounts { total: 9, ..counts };
        assert!(!broken.is_consistent());
    }

    #[test]
    fn vector_store_omits_absent_expiry() {
        let store = VectorStore {
            id: Uuid::new_v4(),
            object: OBJECT_TYPE_VECTOR_STORE.to_string(),
            created_at: 1_700_000_000,
            last_active_at: 1_700_000_000,
            name: Some("s1".to_string()),
            status: VectorStoreStatus::Completed,
            usage_bytes: 0,
            file_counts: FileCounts::default(),
            meta: None,
            expires_after: None,
            expires_at: None,
        };

        let value = serde_json::to_value(&store).unwrap();
        assert_eq!(value["object"], "vector_store");
        assert_eq!(value["status"], "completed");
        assert!(value.get("expires_after").is_none());
        assert!(value.get("expires_at").is_none());
        // metadata is always present (null when unset), matching OpenAI
        assert!(value.get("metadata").is_some());
    }

    #[test]
    fn vector_store_file_wire_shape() {
        let file = VectorStoreFile {
            id: Uuid::new_v4(),
            object: OBJECT_TYPE_VECTOR_STORE_FILE.to_string(),
            vector_store_id: Uuid::new_v4(),
            created_at: 1_700_000_000,
            status: VectorStoreFileStatus::Completed,
            usage_bytes: 0,
            last_error: None,
            chunking_strategy: ChunkingStrategy::Other,
            filename: Some("a.txt".to_string()),
            meta: None,
        };

        let value = serde_json::to_value(&file).unwrap();
        assert_eq!(value["object"], "vector_store.file");
        assert_eq!(value["chunking_strategy"]["type"], "other");
        assert!(value.get("last_error").is_none());
        assert!(value.get("filename").is_none());
    }
}
