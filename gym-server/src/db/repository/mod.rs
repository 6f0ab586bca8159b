//! Repository Module
//!
//! Module-level CRUD functions over the SQLite pool. Member aggregates are
//! loaded, mutated in memory, and saved whole; nested arrays live in JSON
//! TEXT columns.

pub mod expense;
pub mod inquiry;
pub mod member;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use shared::error::{AppError, ErrorCode};

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Corrupt(msg) => AppError::database(format!("Corrupt record: {msg}")),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Serialize a nested structure for a JSON TEXT column
pub(crate) fn to_json<T: Serialize>(value: &T, field: &str) -> RepoResult<String> {
    serde_json::to_string(value)
        .map_err(|e| RepoError::Corrupt(format!("serialize {field}: {e}")))
}

/// Parse a JSON TEXT column back into its nested structure
pub(crate) fn from_json<T: DeserializeOwned>(raw: &str, field: &str) -> RepoResult<T> {
    serde_json::from_str(raw).map_err(|e| RepoError::Corrupt(format!("parse {field}: {e}")))
}

/// Serialize an enum stored as a bare TEXT value ("Paid", "Free Trial", ...)
pub(crate) fn enum_to_text<T: Serialize>(value: &T, field: &str) -> RepoResult<String> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => Ok(s),
        _ => Err(RepoError::Corrupt(format!("serialize {field}"))),
    }
}

/// Parse a bare TEXT value back into its enum
pub(crate) fn enum_from_text<T: DeserializeOwned>(raw: &str, field: &str) -> RepoResult<T> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|e| RepoError::Corrupt(format!("parse {field}: {e}")))
}
