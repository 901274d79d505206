// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Error types for store database operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for store database operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during store database operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to open database at '{path}': {source}")]
    DatabaseOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Database not found at: {0}")]
    DatabaseNotFound(PathBuf),

    /// A query was rooted at a path the database does not know.
    #[error("Path not found: {0}")]
    PathNotFound(String),
}
