use async_trait::async_trait;
use uuid::Uuid;

use super::{ListParams, ListResult};
use crate::{
    db::error::DbResult,
    models::{
        AddVectorStoreFile, CreateVectorStore, FileError, VectorStore, VectorStoreFile,
        VectorStoreFileStatus,
    },
};

/// Repository trait for vector stores and their file memberships.
///
/// `file_counts` and `usage_bytes` on the parent store are derived: every
/// membership-mutating operation recomputes them by aggregation in the same
/// transaction, so `total = in_progress + completed + failed + cancelled`
/// holds after every commit.
#[async_trait]
pub trait VectorStoresRepo: Send + Sync {
    // ==================== Vector Stores CRUD ====================

    /// Create a new vector store.
    ///
    /// Assigns id and timestamps, zeroes all file counts, and sets status
    /// to `completed`; there is no asynchronous processing pipeline, so
    /// stores are immediately ready. When an expiration policy is supplied,
    /// `expires_at` is computed from the creation time.
    async fn create_vector_store(&self, input: CreateVectorStore) -> DbResult<VectorStore>;

    /// Get a vector store by ID. Absence is a normal outcome, not an error.
    async fn get_vector_store(&self, id: Uuid) -> DbResult<Option<VectorStore>>;

    /// List vector stores with keyset pagination over `(created_at, id)`.
    ///
    /// Ordering is stable across repeated calls with no intervening writes,
    /// and chained `after`/`before` cursors never duplicate or skip a
    /// record.
    async fn list_vector_stores(&self, params: ListParams) -> DbResult<ListResult<VectorStore>>;

    /// Delete a vector store and, in the same transaction, all of its file
    /// memberships, so no orphaned membership rows remain.
    ///
    /// Returns whether a store row was actually removed.
    async fn delete_vector_store(&self, id: Uuid) -> DbResult<bool>;

    /// Remove all vector stores and memberships (administrative reset).
    /// Returns the number of store rows removed.
    async fn delete_all_vector_stores(&self) -> DbResult<u64>;

    // ==================== Vector Store Files ====================

    /// Add a file to a vector store.
    ///
    /// The membership row id is the file id; status is recorded as
    /// `completed` immediately (no-op ingestion). The chunking strategy
    /// variant is flattened into discriminator + static columns so that
    /// reconstruction is lossless. Fails with `NotFound` if the store does
    /// not exist and `Conflict` if the file is already a member.
    async fn add_vector_store_file(
        &self,
        vector_store_id: Uuid,
        input: AddVectorStoreFile,
    ) -> DbResult<VectorStoreFile>;

    /// Get a membership record, scoped to both the store and the file id.
    async fn get_vector_store_file(
        &self,
        vector_store_id: Uuid,
        file_id: Uuid,
    ) -> DbResult<Option<VectorStoreFile>>;

    /// Update a membership's status and last-error state, refreshing the
    /// parent store's counts in the same transaction.
    ///
    /// An error is recorded only alongside the new status; passing `None`
    /// clears any previous error (code and message columns always move
    /// together).
    async fn update_vector_store_file_status(
        &self,
        file_id: Uuid,
        status: VectorStoreFileStatus,
        error: Option<FileError>,
    ) -> DbResult<()>;

    /// Remove a membership row, refreshing the parent store's counts in the
    /// same transaction. Returns whether a row was actually removed.
    async fn remove_vector_store_file(&self, file_id: Uuid) -> DbResult<bool>;
}
