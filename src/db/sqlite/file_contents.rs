use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::db::{
    error::{DbError, DbResult},
    repos::FileContentsRepo,
};

pub struct SqliteFileContentsRepo {
    pool: SqlitePool,
}

impl SqliteFileContentsRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileContentsRepo for SqliteFileContentsRepo {
    async fn put(&self, id: Uuid, content: &[u8]) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO file_content (id, content)
            VALUES (?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(content)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::Conflict(format!("Content for file '{}' already exists", id))
            }
            _ => DbError::from(e),
        })?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> DbResult<Option<Vec<u8>>> {
        let result = sqlx::query(
            r#"
            SELECT content
            FROM file_content
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(result.map(|row| row.get::<Vec<u8>, _>("content")))
    }
}
