mod common;
mod file_contents;
mod files;
mod vector_stores;

pub use file_contents::SqliteFileContentsRepo;
pub use files::SqliteFilesRepo;
pub use vector_stores::SqliteVectorStoresRepo;
