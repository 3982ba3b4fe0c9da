use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{CreateFile, File, FilePurpose, FileStatus},
};

/// Repository trait for files (OpenAI Files API) operations.
///
/// A created file is immutable apart from its status; the content blob is
/// written in the same transaction as the metadata row and removed with it.
#[async_trait]
pub trait FilesRepo: Send + Sync {
    /// Create a new file together with its content blob.
    ///
    /// Assigns the id and created_at, defaults status to `uploaded`, and
    /// commits both rows atomically; a file row without its content is
    /// never observable.
    async fn create_file(&self, input: CreateFile) -> DbResult<File>;

    /// Get a file by ID. Absence is a normal outcome, not an error.
    async fn get_file(&self, id: Uuid) -> DbResult<Option<File>>;

    /// List files, optionally filtered by exact purpose.
    ///
    /// Returns a committed-only snapshot; ordering is not part of the
    /// contract.
    async fn list_files(&self, purpose: Option<FilePurpose>) -> DbResult<Vec<File>>;

    /// Update file status (the only mutable field after creation).
    async fn update_file_status(
        &self,
        id: Uuid,
        status: FileStatus,
        status_details: Option<String>,
    ) -> DbResult<()>;

    /// Delete a file; its content blob goes with it via cascade.
    ///
    /// Returns whether a row was actually removed; deleting a missing id
    /// is `Ok(false)`, not an error.
    async fn delete_file(&self, id: Uuid) -> DbResult<bool>;

    /// Remove all files (administrative reset). Returns rows removed.
    async fn delete_all_files(&self) -> DbResult<u64>;
}
