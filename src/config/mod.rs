mod database;

use thiserror::Error;

pub use database::{DatabaseConfig, SqliteConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation error: {0}")]
    Validation(String),
}
