//! Shared tests for FilesRepo and FileContentsRepo implementations
//!
//! Tests are written as async functions that take repo trait objects, so the
//! same logic can run against any backend.

use uuid::Uuid;

use crate::{
    db::{
        error::DbError,
        repos::{FileContentsRepo, FilesRepo},
    },
    models::{CreateFile, FilePurpose, FileStatus, OBJECT_TYPE_FILE},
};

// ============================================================================
// Test Input Helpers
// ============================================================================

fn create_file_input(filename: &str, purpose: FilePurpose, content: &[u8]) -> CreateFile {
    CreateFile {
        filename: filename.to_string(),
        purpose,
        content: content.to_vec(),
        meta: None,
    }
}

// ============================================================================
// Shared Test Functions
// ============================================================================

pub async fn test_create_file(repo: &dyn FilesRepo) {
    let input = create_file_input("report.pdf", FilePurpose::Assistants, b"hello world");
    let file = repo.create_file(input).await.expect("Failed to create file");

    assert!(!file.id.is_nil());
    assert_eq!(file.object, OBJECT_TYPE_FILE);
    assert_eq!(file.filename, "report.pdf");
    assert_eq!(file.purpose, FilePurpose::Assistants);
    assert_eq!(file.status, FileStatus::Uploaded);
    assert_eq!(file.size_bytes, 11);
    assert!(file.created_at > 0);
    assert!(file.status_details.is_none());
}

pub async fn test_create_file_rejects_empty_filename(repo: &dyn FilesRepo) {
    let input = create_file_input("", FilePurpose::Assistants, b"data");
    let result = repo.create_file(input).await;

    assert!(matches!(result, Err(DbError::Validation(_))));
}

pub async fn test_get_file(repo: &dyn FilesRepo) {
    let input = create_file_input("notes.txt", FilePurpose::Vision, b"some notes");
    let created = repo.create_file(input).await.expect("Failed to create file");

    let fetched = repo
        .get_file(created.id)
        .await
        .expect("Failed to get file")
        .expect("File should exist");

    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.filename, "notes.txt");
    assert_eq!(fetched.purpose, FilePurpose::Vision);
    assert_eq!(fetched.size_bytes, created.size_bytes);
    assert_eq!(fetched.created_at, created.created_at);
}

pub async fn test_get_file_not_found(repo: &dyn FilesRepo) {
    let result = repo
        .get_file(Uuid::new_v4())
        .await
        .expect("Query should succeed");

    assert!(result.is_none());
}

pub async fn test_content_round_trip(files: &dyn FilesRepo, contents: &dyn FileContentsRepo) {
    // Binary payload with NUL and high bytes; storage must not mangle it.
    let payload: Vec<u8> = vec![0x00, 0xff, 0x13, 0x37, 0x00, 0x80];
    let input = create_file_input("blob.bin", FilePurpose::Assistants, &payload);
    let file = files.create_file(input).await.expect("Failed to create file");

    let stored = contents
        .get(file.id)
        .await
        .expect("Failed to get content")
        .expect("Content should exist");

    assert_eq!(stored, payload);
}

pub async fn test_empty_content_is_present(files: &dyn FilesRepo, contents: &dyn FileContentsRepo) {
    let input = create_file_input("empty.txt", FilePurpose::Assistants, b"");
    let file = files.create_file(input).await.expect("Failed to create file");

    assert_eq!(file.size_bytes, 0);

    // An empty blob is still a blob; only a missing row reads back as None.
    let stored = contents
        .get(file.id)
        .await
        .expect("Failed to get content");

    assert_eq!(stored, Some(Vec::new()));
}

pub async fn test_content_missing_is_none(contents: &dyn FileContentsRepo) {
    let result = contents
        .get(Uuid::new_v4())
        .await
        .expect("Query should succeed");

    assert!(result.is_none());
}

pub async fn test_content_put_duplicate_fails(
    files: &dyn FilesRepo,
    contents: &dyn FileContentsRepo,
) {
    let input = create_file_input("once.txt", FilePurpose::Assistants, b"first");
    let file = files.create_file(input).await.expect("Failed to create file");

    let result = contents.put(file.id, b"second").await;

    assert!(matches!(result, Err(DbError::Conflict(_))));
}

pub async fn test_list_files_filters_by_purpose(repo: &dyn FilesRepo) {
    repo.create_file(create_file_input("a.txt", FilePurpose::Assistants, b"a"))
        .await
        .expect("Failed to create file a");
    repo.create_file(create_file_input("b.png", FilePurpose::Vision, b"b"))
        .await
        .expect("Failed to create file b");
    repo.create_file(create_file_input("c.jsonl", FilePurpose::Batch, b"c"))
        .await
        .expect("Failed to create file c");

    let all = repo.list_files(None).await.expect("Failed to list files");
    assert_eq!(all.len(), 3);

    let vision = repo
        .list_files(Some(FilePurpose::Vision))
        .await
        .expect("Failed to list vision files");
    assert_eq!(vision.len(), 1);
    assert_eq!(vision[0].filename, "b.png");

    let fine_tune = repo
        .list_files(Some(FilePurpose::FineTune))
        .await
        .expect("Failed to list fine-tune files");
    assert!(fine_tune.is_empty());
}

pub async fn test_update_file_status(repo: &dyn FilesRepo) {
    let input = create_file_input("pending.txt", FilePurpose::Assistants, b"x");
    let file = repo.create_file(input).await.expect("Failed to create file");

    repo.update_file_status(file.id, FileStatus::Error, Some("parse failure".to_string()))
        .await
        .expect("Failed to update status");

    let fetched = repo
        .get_file(file.id)
        .await
        .expect("Failed to get file")
        .expect("File should exist");

    assert_eq!(fetched.status, FileStatus::Error);
    assert_eq!(fetched.status_details.as_deref(), Some("parse failure"));
}

pub async fn test_update_file_status_not_found(repo: &dyn FilesRepo) {
    let result = repo
        .update_file_status(Uuid::new_v4(), FileStatus::Processed, None)
        .await;

    assert!(matches!(result, Err(DbError::NotFound)));
}

pub async fn test_delete_file(files: &dyn FilesRepo, contents: &dyn FileContentsRepo) {
    let input = create_file_input("doomed.txt", FilePurpose::Assistants, b"bytes");
    let file = files.create_file(input).await.expect("Failed to create file");

    let deleted = files.delete_file(file.id).await.expect("Failed to delete");
    assert!(deleted);

    assert!(
        files
            .get_file(file.id)
            .await
            .expect("Query should succeed")
            .is_none()
    );

    // The content blob is removed by the cascade, not left orphaned.
    assert!(
        contents
            .get(file.id)
            .await
            .expect("Query should succeed")
            .is_none()
    );
}

pub async fn test_delete_file_missing_returns_false(repo: &dyn FilesRepo) {
    let deleted = repo
        .delete_file(Uuid::new_v4())
        .await
        .expect("Delete should succeed");

    assert!(!deleted);
}

pub async fn test_delete_file_twice(repo: &dyn FilesRepo) {
    let input = create_file_input("twice.txt", FilePurpose::Assistants, b"z");
    let file = repo.create_file(input).await.expect("Failed to create file");

    assert!(repo.delete_file(file.id).await.expect("First delete failed"));
    assert!(!repo.delete_file(file.id).await.expect("Second delete failed"));
}

pub async fn test_delete_all_files(repo: &dyn FilesRepo) {
    for i in 0..3 {
        repo.create_file(create_file_input(
            &format!("f{i}.txt"),
            FilePurpose::Assistants,
            b"data",
        ))
        .await
        .expect("Failed to create file");
    }

    let removed = repo.delete_all_files().await.expect("Failed to delete all");
    assert_eq!(removed, 3);

    let remaining = repo.list_files(None).await.expect("Failed to list files");
    assert!(remaining.is_empty());
}

// ============================================================================
// SQLite Tests
// ============================================================================

#[cfg(feature = "database-sqlite")]
mod sqlite_tests {
    use super::*;
    use crate::db::{
        sqlite::{SqliteFileContentsRepo, SqliteFilesRepo},
        tests::harness::{create_sqlite_pool, run_sqlite_migrations},
    };

    async fn create_repos() -> (SqliteFilesRepo, SqliteFileContentsRepo) {
        let pool = create_sqlite_pool().await;
        run_sqlite_migrations(&pool).await;
        (
            SqliteFilesRepo::new(pool.clone()),
            SqliteFileContentsRepo::new(pool),
        )
    }

    #[tokio::test]
    async fn sqlite_create_file() {
        let (files, _) = create_repos().await;
        test_create_file(&files).await;
    }

    #[tokio::test]
    async fn sqlite_create_file_rejects_empty_filename() {
        let (files, _) = create_repos().await;
        test_create_file_rejects_empty_filename(&files).await;
    }

    #[tokio::test]
    async fn sqlite_get_file() {
        let (files, _) = create_repos().await;
        test_get_file(&files).await;
    }

    #[tokio::test]
    async fn sqlite_get_file_not_found() {
        let (files, _) = create_repos().await;
        test_get_file_not_found(&files).await;
    }

    #[tokio::test]
    async fn sqlite_content_round_trip() {
        let (files, contents) = create_repos().await;
        test_content_round_trip(&files, &contents).await;
    }

    #[tokio::test]
    async fn sqlite_empty_content_is_present() {
        let (files, contents) = create_repos().await;
        test_empty_content_is_present(&files, &contents).await;
    }

    #[tokio::test]
    async fn sqlite_content_missing_is_none() {
        let (_, contents) = create_repos().await;
        test_content_missing_is_none(&contents).await;
    }

    #[tokio::test]
    async fn sqlite_content_put_duplicate_fails() {
        let (files, contents) = create_repos().await;
        test_content_put_duplicate_fails(&files, &contents).await;
    }

    #[tokio::test]
    async fn sqlite_list_files_filters_by_purpose() {
        let (files, _) = create_repos().await;
        test_list_files_filters_by_purpose(&files).await;
    }

    #[tokio::test]
    async fn sqlite_update_file_status() {
        let (files, _) = create_repos().await;
        test_update_file_status(&files).await;
    }

    #[tokio::test]
    async fn sqlite_update_file_status_not_found() {
        let (files, _) = create_repos().await;
        test_update_file_status_not_found(&files).await;
    }

    #[tokio::test]
    async fn sqlite_delete_file() {
        let (files, contents) = create_repos().await;
        test_delete_file(&files, &contents).await;
    }

    #[tokio::test]
    async fn sqlite_delete_file_missing_returns_false() {
        let (files, _) = create_repos().await;
        test_delete_file_missing_returns_false(&files).await;
    }

    #[tokio::test]
    async fn sqlite_delete_file_twice() {
        let (files, _) = create_repos().await;
        test_delete_file_twice(&files).await;
    }

    #[tokio::test]
    async fn sqlite_delete_all_files() {
        let (files, _) = create_repos().await;
        test_delete_all_files(&files).await;
    }
}
