// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::hash::ParseHashError;
use crate::store_path::ParseStorePathError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("path '{path}' is not a valid store path: {reason}")]
    InvalidPath {
        path: String,
        #[source]
        reason: ParseStorePathError,
    },

    #[error("path '{0}' is not valid")]
    PathNotFound(String),

    #[error("path '{path}' has an invalid NAR hash: {reason}")]
    InvalidHash {
        path: String,
        #[source]
        reason: ParseHashError,
    },

    #[error("Store database error: {0}")]
    StoreDb(#[from] harmonia_store_db::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {reason}")]
    Invalid { reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to IO errors
pub trait IoErrorContext<T> {
    fn io_context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> IoErrorContext<T> for std::result::Result<T, std::io::Error> {
    fn io_context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io {
            context: context.into(),
            source: e,
        })
    }
}
