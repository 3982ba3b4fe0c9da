use async_trait::async_trait;
use uuid::Uuid;

use crate::db::error::DbResult;

/// Repository trait for the content store: raw upload bytes keyed by file id.
///
/// `FilesRepo::create_file` writes the blob itself (atomically with the
/// metadata row); this trait exists for direct content access and for
/// callers that manage blobs out of band.
#[async_trait]
pub trait FileContentsRepo: Send + Sync {
    /// Store raw content for a file id.
    ///
    /// Fails with `Conflict` if content already exists for the id (one blob
    /// per file). The bytes are opaque; no validation happens here.
    async fn put(&self, id: Uuid, content: &[u8]) -> DbResult<()>;

    /// Fetch the raw content for a file id.
    ///
    /// `Ok(None)` means no blob exists, distinct from `Ok(Some(vec![]))`,
    /// a present but empty payload.
    async fn get(&self, id: Uuid) -> DbResult<Option<Vec<u8>>>;
}
