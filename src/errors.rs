//! Error types for the MOBIO database accessor.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("invalid {dimension} '{value}'")]
    InvalidArgument {
        dimension: &'static str,
        value: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database unavailable: {} does not exist", .0.display())]
    Unavailable(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl DbError {
    pub(crate) fn invalid(dimension: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidArgument {
            dimension,
            value: value.into(),
        }
    }
}
