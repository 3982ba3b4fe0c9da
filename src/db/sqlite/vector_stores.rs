use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;
use validator::Validate;

use super::common::{meta_from_json, meta_to_json, parse_uuid, unix_now};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::{
            Cursor, CursorDirection, ListParams, ListResult, PageCursors, VectorStoresRepo,
        },
    },
    models::{
        AddVectorStoreFile, ChunkingStrategy, CreateVectorStore, EXPIRES_ANCHOR_LAST_ACTIVE_AT,
        ExpiresAfter, FileCounts, FileError, OBJECT_TYPE_VECTOR_STORE,
        OBJECT_TYPE_VECTOR_STORE_FILE, StaticChunkingConfig, VectorStore, VectorStoreFile,
        VectorStoreFileStatus, VectorStoreStatus,
    },
};

const SECONDS_PER_DAY: i64 = 86_400;

pub struct SqliteVectorStoresRepo {
    pool: SqlitePool,
}

impl SqliteVectorStoresRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Reconstruct the expiration policy from its flattened columns.
    /// The policy exists only when `expires_after_days` is non-NULL.
    fn expires_after_from_columns(
        anchor: Option<String>,
        days: Option<i64>,
    ) -> Option<ExpiresAfter> {
        days.map(|days| ExpiresAfter {
            anchor: anchor.unwrap_or_else(|| EXPIRES_ANCHOR_LAST_ACTIVE_AT.to_string()),
            days,
        })
    }

    /// Reconstruct the last-error pair from its flattened columns.
    /// Code and message are either both set or both NULL; the code column
    /// is the discriminating one.
    fn last_error_from_columns(
        code: Option<String>,
        message: Option<String>,
    ) -> DbResult<Option<FileError>> {
        match code {
            Some(code) => Ok(Some(FileError {
                code: code.parse().map_err(|e: String| DbError::Internal(e))?,
                message: message.unwrap_or_default(),
            })),
            None => Ok(None),
        }
    }

    /// Reconstruct the chunking strategy from its flattened columns,
    /// driven by the `chunking_strategy_type` discriminator. Anything other
    /// than `static` (including a NULL discriminator in legacy rows)
    /// reconstructs as `Other`.
    fn chunking_strategy_from_columns(
        discriminator: Option<String>,
        max_chunk_size_tokens: Option<i64>,
        chunk_overlap_tokens: Option<i64>,
    ) -> ChunkingStrategy {
        match discriminator.as_deref() {
            Some("static") => ChunkingStrategy::Static {
                config: StaticChunkingConfig {
                    max_chunk_size_tokens: max_chunk_size_tokens
                        .unwrap_or_else(|| StaticChunkingConfig::default().max_chunk_size_tokens),
                    chunk_overlap_tokens: chunk_overlap_tokens
                        .unwrap_or_else(|| StaticChunkingConfig::default().chunk_overlap_tokens),
                },
            },
            _ => ChunkingStrategy::Other,
        }
    }

    /// Flatten a chunking strategy into (discriminator, max_chunk_size,
    /// chunk_overlap) column values. Exactly one variant's fields are set;
    /// the discriminator is always written.
    fn chunking_strategy_to_columns(
        strategy: &ChunkingStrategy,
    ) -> (&'static str, Option<i64>, Option<i64>) {
        match strategy {
            ChunkingStrategy::Static { config } => (
                strategy.discriminator(),
                Some(config.max_chunk_size_tokens),
                Some(config.chunk_overlap_tokens),
            ),
            ChunkingStrategy::Other => (strategy.discriminator(), None, None),
        }
    }

    /// Parse a VectorStore from a database row.
    /// Expects all columns of the `vector_store` table.
    fn vector_store_from_row(row: &sqlx::sqlite::SqliteRow) -> DbResult<VectorStore> {
        let status_str: String = row.get("status");

        Ok(VectorStore {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            object: OBJECT_TYPE_VECTOR_STORE.to_string(),
            created_at: row.get("created_at"),
            last_active_at: row.get("last_active_at"),
            name: row.get("name"),
            status: status_str
                .parse()
                .map_err(|e: String| DbError::Internal(e))?,
            usage_bytes: row.get("usage_bytes"),
            file_counts: FileCounts {
                in_progress: row.get("file_counts_in_progress"),
                completed: row.get("file_counts_completed"),
                failed: row.get("file_counts_failed"),
                cancelled: row.get("file_counts_cancelled"),
                total: row.get("file_counts_total"),
            },
            meta: meta_from_json(row.get("meta"))?,
            expires_after: Self::expires_after_from_columns(
                row.get("expires_after_anchor"),
                row.get("expires_after_days"),
            ),
            expires_at: row.get("expires_at"),
        })
    }

    /// Parse a VectorStoreFile from a database row.
    /// Expects all columns of the `vector_store_file` table.
    fn vector_store_file_from_row(row: &sqlx::sqlite::SqliteRow) -> DbResult<VectorStoreFile> {
        let status_str: String = row.get("status");

        Ok(VectorStoreFile {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            object: OBJECT_TYPE_VECTOR_STORE_FILE.to_string(),
            vector_store_id: parse_uuid(&row.get::<String, _>("vector_store_id"))?,
            created_at: row.get("created_at"),
            status: status_str
                .parse()
                .map_err(|e: String| DbError::Internal(e))?,
            usage_bytes: row.get("usage_bytes"),
            last_error: Self::last_error_from_columns(
                row.get("last_error_code"),
                row.get("last_error_message"),
            )?,
            chunking_strategy: Self::chunking_strategy_from_columns(
                row.get("chunking_strategy_type"),
                row.get("chunking_strategy_static_max_chunk_size_tokens"),
                row.get("chunking_strategy_static_chunk_overlap_tokens"),
            ),
            filename: row.get("filename"),
            meta: meta_from_json(row.get("meta"))?,
        })
    }

    fn cursor_from_vector_store(store: &VectorStore) -> Cursor {
        Cursor::new(store.created_at, store.id)
    }

    /// Recalculate the parent store's file counts and usage from its
    /// memberships. Runs on the caller's transaction so the aggregates
    /// commit atomically with the membership mutation that triggered them.
    async fn refresh_store_stats(
        tx: &mut sqlx::SqliteConnection,
        vector_store_id: Uuid,
    ) -> DbResult<()> {
        let stats = sqlx::query(
            r#"
            SELECT
                COALESCE(SUM(usage_bytes), 0) as total_usage,
                COUNT(*) FILTER (WHERE status = 'in_progress') as in_progress,
                COUNT(*) FILTER (WHERE status = 'completed') as completed,
                COUNT(*) FILTER (WHERE status = 'failed') as failed,
                COUNT(*) FILTER (WHERE status = 'cancelled') as cancelled,
                COUNT(*) as total
            FROM vector_store_file
            WHERE vector_store_id = ?
            "#,
        )
        .bind(vector_store_id.to_string())
        .fetch_one(&mut *tx)
        .await?;

        let total_usage: i64 = stats.get("total_usage");
        let in_progress: i64 = stats.get("in_progress");
        let completed: i64 = stats.get("completed");
        let failed: i64 = stats.get("failed");
        let cancelled: i64 = stats.get("cancelled");
        let total: i64 = stats.get("total");

        sqlx::query(
            r#"
            UPDATE vector_store
            SET usage_bytes = ?,
                file_counts_in_progress = ?,
                file_counts_completed = ?,
                file_counts_failed = ?,
                file_counts_cancelled = ?,
                file_counts_total = ?,
                last_active_at = ?
            WHERE id = ?
            "#,
        )
        .bind(total_usage)
        .bind(in_progress)
        .bind(completed)
        .bind(failed)
        .bind(cancelled)
        .bind(total)
        .bind(unix_now())
        .bind(vector_store_id.to_string())
        .execute(&mut *tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl VectorStoresRepo for SqliteVectorStoresRepo {
    // ==================== Vector Stores CRUD ====================

    async fn create_vector_store(&self, input: CreateVectorStore) -> DbResult<VectorStore> {
        input.validate()?;

        let id = Uuid::new_v4();
        let now = unix_now();
        let meta_json = meta_to_json(&input.meta)?;

        // Expiry is computed eagerly; the anchor is always last_active_at,
        // which equals created_at at this point.
        let (expires_anchor, expires_days, expires_at) = match &input.expires_after {
            Some(policy) => (
                Some(policy.anchor.clone()),
                Some(policy.days),
                Some(now + policy.days * SECONDS_PER_DAY),
            ),
            None => (None, None, None),
        };

        sqlx::query(
            r#"
            INSERT INTO vector_store (
                id, created_at, last_active_at, meta, name, object, status, usage_bytes,
                expires_after_anchor, expires_after_days, expires_at,
                file_counts_in_progress, file_counts_completed, file_counts_failed,
                file_counts_cancelled, file_counts_total
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, 0, 0, 0, 0, 0)
            "#,
        )
        .bind(id.to_string())
        .bind(now)
        .bind(now)
        .bind(&meta_json)
        .bind(&input.name)
        .bind(OBJECT_TYPE_VECTOR_STORE)
        .bind(VectorStoreStatus::Completed.as_str())
        .bind(&expires_anchor)
        .bind(expires_days)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(VectorStore {
            id,
            object: OBJECT_TYPE_VECTOR_STORE.to_string(),
            created_at: now,
            last_active_at: now,
            name: input.name,
            status: VectorStoreStatus::Completed,
            usage_bytes: 0,
            file_counts: FileCounts::default(),
            meta: input.meta,
            expires_after: input.expires_after,
            expires_at,
        })
    }

    async fn get_vector_store(&self, id: Uuid) -> DbResult<Option<VectorStore>> {
        let result = sqlx::query(
            r#"
            SELECT id, created_at, last_active_at, meta, name, object, status, usage_bytes,
                   expires_after_anchor, expires_after_days, expires_at,
                   file_counts_in_progress, file_counts_completed, file_counts_failed,
                   file_counts_cancelled, file_counts_total
            FROM vector_store
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match result {
            Some(row) => Ok(Some(Self::vector_store_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_vector_stores(&self, params: ListParams) -> DbResult<ListResult<VectorStore>> {
        let limit = params.limit.unwrap_or(100);
        let fetch_limit = limit + 1;

        // Handle cursor-based pagination
        if let Some(ref cursor) = params.cursor {
            let (comparison, order, should_reverse) =
                params.sort_order.cursor_query_params(params.direction);

            let query = format!(
                r#"
                SELECT id, created_at, last_active_at, meta, name, object, status, usage_bytes,
                       expires_after_anchor, expires_after_days, expires_at,
                       file_counts_in_progress, file_counts_completed, file_counts_failed,
                       file_counts_cancelled, file_counts_total
                FROM vector_store
                WHERE (created_at, id) {} (?, ?)
                ORDER BY created_at {}, id {}
                LIMIT ?
                "#,
                comparison, order, order
            );

            let rows = sqlx::query(&query)
                .bind(cursor.created_at)
                .bind(cursor.id.to_string())
                .bind(fetch_limit)
                .fetch_all(&self.pool)
                .await?;

            let has_more = rows.len() as i64 > limit;
            let mut items: Vec<VectorStore> = rows
                .into_iter()
                .take(limit as usize)
                .map(|row| Self::vector_store_from_row(&row))
                .collect::<DbResult<Vec<_>>>()?;

            if should_reverse {
                items.reverse();
            }

            let cursors = PageCursors::from_items(
                &items,
                has_more,
                params.direction,
                Some(cursor),
                Self::cursor_from_vector_store,
            );

            return Ok(ListResult::new(items, has_more, cursors));
        }

        // First page (no cursor)
        let order = params.sort_order.as_sql();
        let query = format!(
            r#"
            SELECT id, created_at, last_active_at, meta, name, object, status, usage_bytes,
                   expires_after_anchor, expires_after_days, expires_at,
                   file_counts_in_progress, file_counts_completed, file_counts_failed,
                   file_counts_cancelled, file_counts_total
            FROM vector_store
            ORDER BY created_at {}, id {}
            LIMIT ?
            "#,
            order, order
        );

        let rows = sqlx::query(&query)
            .bind(fetch_limit)
            .fetch_all(&self.pool)
            .await?;

        let has_more = rows.len() as i64 > limit;
        let items: Vec<VectorStore> = rows
            .into_iter()
            .take(limit as usize)
            .map(|row| Self::vector_store_from_row(&row))
            .collect::<DbResult<Vec<_>>>()?;

        let cursors = PageCursors::from_items(
            &items,
            has_more,
            CursorDirection::Forward,
            None,
            Self::cursor_from_vector_store,
        );

        Ok(ListResult::new(items, has_more, cursors))
    }

    async fn delete_vector_store(&self, id: Uuid) -> DbResult<bool> {
        // Memberships go in the same transaction: no orphaned rows.
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM vector_store_file
            WHERE vector_store_id = ?
            "#,
        )
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            r#"
            DELETE FROM vector_store
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_vector_stores(&self) -> DbResult<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM vector_store_file")
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM vector_store")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let removed = result.rows_affected();
        tracing::info!(removed, "Deleted all vector stores");
        Ok(removed)
    }

    // ==================== Vector Store Files ====================

    async fn add_vector_store_file(
        &self,
        vector_store_id: Uuid,
        input: AddVectorStoreFile,
    ) -> DbResult<VectorStoreFile> {
        input.validate()?;

        let now = unix_now();
        let meta_json = meta_to_json(&input.meta)?;
        let chunking_strategy = input.chunking_strategy.unwrap_or_default();
        let (strategy_type, max_chunk_size, chunk_overlap) =
            Self::chunking_strategy_to_columns(&chunking_strategy);
        // No processing pipeline: ingestion is a no-op and the membership
        // is complete the moment it is recorded.
        let status = VectorStoreFileStatus::Completed;

        let mut tx = self.pool.begin().await?;

        let store_exists = sqlx::query(
            r#"
            SELECT id FROM vector_store WHERE id = ?
            "#,
        )
        .bind(vector_store_id.to_string())
        .fetch_optional(&mut *tx)
        .await?
        .is_some();

        if !store_exists {
            return Err(DbError::NotFound);
        }

        sqlx::query(
            r#"
            INSERT INTO vector_store_file (
                id, vector_store_id, filename, meta, created_at,
                last_error_code, last_error_message, object, status, usage_bytes,
                chunking_strategy_type,
                chunking_strategy_static_max_chunk_size_tokens,
                chunking_strategy_static_chunk_overlap_tokens
            )
            VALUES (?, ?, ?, ?, ?, NULL, NULL, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(input.file_id.to_string())
        .bind(vector_store_id.to_string())
        .bind(&input.filename)
        .bind(&meta_json)
        .bind(now)
        .bind(OBJECT_TYPE_VECTOR_STORE_FILE)
        .bind(status.as_str())
        .bind(input.usage_bytes)
        .bind(strategy_type)
        .bind(max_chunk_size)
        .bind(chunk_overlap)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => DbError::Conflict(
                format!("File '{}' is already in a vector store", input.file_id),
            ),
            _ => DbError::from(e),
        })?;

        Self::refresh_store_stats(&mut tx, vector_store_id).await?;

        tx.commit().await?;

        Ok(VectorStoreFile {
            id: input.file_id,
            object: OBJECT_TYPE_VECTOR_STORE_FILE.to_string(),
            vector_store_id,
            created_at: now,
            status,
            usage_bytes: input.usage_bytes,
            last_error: None,
            chunking_strategy,
            filename: input.filename,
            meta: input.meta,
        })
    }

    async fn get_vector_store_file(
        &self,
        vector_store_id: Uuid,
        file_id: Uuid,
    ) -> DbResult<Option<VectorStoreFile>> {
        // Membership identity is the (store, file) pair; never match on the
        // bare file id.
        let result = sqlx::query(
            r#"
            SELECT id, vector_store_id, filename, meta, created_at,
                   last_error_code, last_error_message, object, status, usage_bytes,
                   chunking_strategy_type,
                   chunking_strategy_static_max_chunk_size_tokens,
                   chunking_strategy_static_chunk_overlap_tokens
            FROM vector_store_file
            WHERE id = ? AND vector_store_id = ?
            "#,
        )
        .bind(file_id.to_string())
        .bind(vector_store_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match result {
            Some(row) => Ok(Some(Self::vector_store_file_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn update_vector_store_file_status(
        &self,
        file_id: Uuid,
        status: VectorStoreFileStatus,
        error: Option<FileError>,
    ) -> DbResult<()> {
        let (error_code, error_message) = match &error {
            Some(e) => (Some(e.code.as_str()), Some(e.message.clone())),
            None => (None, None),
        };

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            SELECT vector_store_id FROM vector_store_file WHERE id = ?
            "#,
        )
        .bind(file_id.to_string())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(DbError::NotFound);
        };
        let vector_store_id = parse_uuid(&row.get::<String, _>("vector_store_id"))?;

        sqlx::query(
            r#"
            UPDATE vector_store_file
            SET status = ?, last_error_code = ?, last_error_message = ?
            WHERE id = ?
            "#,
        )
        .bind(status.as_str())
        .bind(error_code)
        .bind(&error_message)
        .bind(file_id.to_string())
        .execute(&mut *tx)
        .await?;

        Self::refresh_store_stats(&mut tx, vector_store_id).await?;

        tx.commit().await?;

        Ok(())
    }

    async fn remove_vector_store_file(&self, file_id: Uuid) -> DbResult<bool> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            SELECT vector_store_id FROM vector_store_file WHERE id = ?
            "#,
        )
        .bind(file_id.to_string())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(false);
        };
        let vector_store_id = parse_uuid(&row.get::<String, _>("vector_store_id"))?;

        sqlx::query(
            r#"
            DELETE FROM vector_store_file
            WHERE id = ?
            "#,
        )
        .bind(file_id.to_string())
        .execute(&mut *tx)
        .await?;

        Self::refresh_store_stats(&mut tx, vector_store_id).await?;

        tx.commit().await?;

        Ok(true)
    }
}
