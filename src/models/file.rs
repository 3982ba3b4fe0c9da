use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Object type identifier for File resources (OpenAI API compatibility)
pub const OBJECT_TYPE_FILE: &str = "file";

/// Intended use of an uploaded file (OpenAI Files API compatible)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilePurpose {
    Assistants,
    AssistantsOutput,
    Batch,
    BatchOutput,
    #[serde(rename = "fine-tune")]
    FineTune,
    #[serde(rename = "fine-tune-results")]
    FineTuneResults,
    Vision,
}

impl FilePurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilePurpose::Assistants => "assistants",
            FilePurpose::AssistantsOutput => "assistants_output",
            FilePurpose::Batch => "batch",
            FilePurpose::BatchOutput => "batch_output",
            FilePurpose::FineTune => "fine-tune",
            FilePurpose::FineTuneResults => "fine-tune-results",
            FilePurpose::Vision => "vision",
        }
    }
}

impl std::str::FromStr for FilePurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assistants" => Ok(FilePurpose::Assistants),
            "assistants_output" => Ok(FilePurpose::AssistantsOutput),
            "batch" => Ok(FilePurpose::Batch),
            "batch_output" => Ok(FilePurpose::BatchOutput),
            "fine-tune" => Ok(FilePurpose::FineTune),
            "fine-tune-results" => Ok(FilePurpose::FineTuneResults),
            "vision" => Ok(FilePurpose::Vision),
            _ => Err(format!("Invalid file purpose: {}", s)),
        }
    }
}

/// Upload lifecycle status of a file.
///
/// This tracks the upload itself; processing status within a vector store
/// is tracked separately via `VectorStoreFileStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    #[default]
    Uploaded,
    Processed,
    Error,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Uploaded => "uploaded",
            FileStatus::Processed => "processed",
            FileStatus::Error => "error",
        }
    }
}

impl std::str::FromStr for FileStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploaded" => Ok(FileStatus::Uploaded),
            "processed" => Ok(FileStatus::Processed),
            "error" => Ok(FileStatus::Error),
            _ => Err(format!("Invalid file status: {}", s)),
        }
    }
}

/// An uploaded file (OpenAI Files API compatible).
///
/// The metadata row lives in the `file` table; the raw bytes live in
/// `file_content`, keyed by the same id and deleted with it.
///
/// Serializes to the OpenAI `file` object: `{id, object, bytes, created_at,
/// filename, purpose, status}`. Internal bookkeeping fields are skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    pub id: Uuid,
    /// Object type identifier (always "file" for API compatibility)
    #[serde(default = "default_file_object")]
    pub object: String,
    #[serde(rename = "bytes")]
    pub size_bytes: i64,
    /// Creation time as Unix epoch seconds (OpenAI wire format)
    pub created_at: i64,
    pub filename: String,
    pub purpose: FilePurpose,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_details: Option<String>,
    /// Opaque caller-supplied metadata; stored but not part of the wire shape
    #[serde(skip)]
    pub meta: Option<serde_json::Value>,
}

fn default_file_object() -> String {
    OBJECT_TYPE_FILE.to_string()
}

/// Request to create a new file.
///
/// The registry assigns the id and created_at; `size_bytes` is derived from
/// `content`, and the metadata row and content blob are committed in a
/// single transaction.
#[derive(Debug, Clone, Validate)]
pub struct CreateFile {
    #[validate(length(min = 1, max = 255))]
    pub filename: String,
    pub purpose: FilePurpose,
    /// Raw upload bytes, already decoded from the wire by the transport
    /// layer. Arbitrary binary; size limits are the transport's concern.
    pub content: Vec<u8>,
    pub meta: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purpose_round_trips_through_str() {
        for purpose in [
            FilePurpose::Assistants,
            FilePurpose::AssistantsOutput,
            FilePurpose::Batch,
            FilePurpose::BatchOutput,
            FilePurpose::FineTune,
            FilePurpose::FineTuneResults,
            FilePurpose::Vision,
        ] {
            assert_eq!(purpose.as_str().parse::<FilePurpose>(), Ok(purpose));
        }
    }

    #[test]
    fn purpose_serde_matches_wire_names() {
        assert_eq!(
            serde_json::to_string(&FilePurpose::FineTune).unwrap(),
            "\"fine-tune\""
        );
        assert_eq!(
            serde_json::to_string(&FilePurpose::AssistantsOutput).unwrap(),
            "\"assistants_output\""
        );
    }

    #[test]
    fn file_serializes_to_openai_shape() {
        let file = File {
            id: Uuid::new_v4(),
            object: OBJECT_TYPE_FILE.to_string(),
            size_bytes: 11,
            created_at: 1_700_000_000,
            filename: "a.txt".to_string(),
            purpose: FilePurpose::Assistants,
            status: FileStatus::Uploaded,
            status_details: None,
            meta: Some(serde_json::json!({"internal": true})),
        };

        let value = serde_json::to_value(&file).unwrap();
        assert_eq!(value["object"], "file");
        assert_eq!(value["bytes"], 11);
        assert_eq!(value["status"], "uploaded");
        assert!(value.get("meta").is_none());
        assert!(value.get("status_details").is_none());
    }
}
