use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;
use validator::Validate;

use super::common::{meta_from_json, meta_to_json, parse_uuid, unix_now};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::FilesRepo,
    },
    models::{CreateFile, File, FilePurpose, FileStatus, OBJECT_TYPE_FILE},
};

pub struct SqliteFilesRepo {
    pool: SqlitePool,
}

impl SqliteFilesRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Parse a File from a database row.
    /// Expects columns: id, bytes, created_at, filename, purpose, status,
    /// status_details, meta
    fn file_from_row(row: &sqlx::sqlite::SqliteRow) -> DbResult<File> {
        let purpose_str: String = row.get("purpose");
        let status_str: String = row.get("status");

        Ok(File {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            object: OBJECT_TYPE_FILE.to_string(),
            size_bytes: row.get("bytes"),
            created_at: row.get("created_at"),
            filename: row.get("filename"),
            purpose: purpose_str
                .parse()
                .map_err(|e: String| DbError::Internal(e))?,
            status: status_str
                .parse()
                .map_err(|e: String| DbError::Internal(e))?,
            status_details: row.get("status_details"),
            meta: meta_from_json(row.get("meta"))?,
        })
    }
}

#[async_trait]
impl FilesRepo for SqliteFilesRepo {
    async fn create_file(&self, input: CreateFile) -> DbResult<File> {
        input.validate()?;

        let id = Uuid::new_v4();
        let now = unix_now();
        let size_bytes = input.content.len() as i64;
        let meta_json = meta_to_json(&input.meta)?;

        // Metadata row and content blob commit together or not at all.
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO file (id, object, bytes, created_at, filename, purpose, status, status_details, meta)
            VALUES (?, ?, ?, ?, ?, ?, ?, NULL, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(OBJECT_TYPE_FILE)
        .bind(size_bytes)
        .bind(now)
        .bind(&input.filename)
        .bind(input.purpose.as_str())
        .bind(FileStatus::Uploaded.as_str())
        .bind(&meta_json)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO file_content (id, content)
            VALUES (?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&input.content)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(File {
            id,
            object: OBJECT_TYPE_FILE.to_string(),
            size_bytes,
            created_at: now,
            filename: input.filename,
            purpose: input.purpose,
            status: FileStatus::Uploaded,
            status_details: None,
            meta: input.meta,
        })
    }

    async fn get_file(&self, id: Uuid) -> DbResult<Option<File>> {
        let result = sqlx::query(
            r#"
            SELECT id, bytes, created_at, filename, purpose, status, status_details, meta
            FROM file
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match result {
            Some(row) => Ok(Some(Self::file_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_files(&self, purpose: Option<FilePurpose>) -> DbResult<Vec<File>> {
        let rows = match purpose {
            Some(p) => {
                sqlx::query(
                    r#"
                    SELECT id, bytes, created_at, filename, purpose, status, status_details, meta
                    FROM file
                    WHERE purpose = ?
                    "#,
                )
                .bind(p.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, bytes, created_at, filename, purpose, status, status_details, meta
                    FROM file
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(Self::file_from_row).collect()
    }

    async fn update_file_status(
        &self,
        id: Uuid,
        status: FileStatus,
        status_details: Option<String>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE file
            SET status = ?, status_details = ?
            WHERE id = ?
            "#,
        )
        .bind(status.as_str())
        .bind(&status_details)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    async fn delete_file(&self, id: Uuid) -> DbResult<bool> {
        // file_content goes with it via ON DELETE CASCADE.
        let result = sqlx::query(
            r#"
            DELETE FROM file
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_files(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM file").execute(&self.pool).await?;
        let removed = result.rows_affected();
        tracing::info!(removed, "Deleted all files");
        Ok(removed)
    }
}
