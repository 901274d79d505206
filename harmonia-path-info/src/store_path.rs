// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Store paths and the store directory they live in.

use std::fmt;

use derive_more::Display;
use thiserror::Error;

use crate::base32;

/// Length of the nix-base32 encoded digest at the start of a store path.
pub const HASH_PART_LEN: usize = 32;

/// Longest name Nix accepts for a store path.
pub const MAX_NAME_LEN: usize = 211;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseStorePathError {
    #[error("not in the store directory '{0}'")]
    NotInStore(String),
    #[error("refers to a file inside a store path")]
    NestedPath,
    #[error("too short")]
    TooShort,
    #[error("missing dash between hash and name")]
    MissingDash,
    #[error("hash part '{0}' is not nix-base32")]
    InvalidHash(String),
    #[error("name is empty or longer than {MAX_NAME_LEN} characters")]
    InvalidNameLength,
    #[error("name '{name}' contains an illegal character at position {position}")]
    InvalidName { name: String, position: usize },
}

/// The base name of a store path, `<hash>-<name>`.
///
/// Ordered by its textual form, which for paths in the same store directory
/// is the order of their printed forms.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display("{hash_part}-{name}")]
pub struct StorePath {
    hash_part: String,
    name: String,
}

impl StorePath {
    /// Parse the `<hash>-<name>` base name.
    pub fn from_base_name(s: &str) -> Result<StorePath, ParseStorePathError> {
        if s.len() < HASH_PART_LEN + 2 {
            return Err(ParseStorePathError::TooShort);
        }
        if !s.is_char_boundary(HASH_PART_LEN) {
            return Err(ParseStorePathError::InvalidHash(
                s.chars().take(HASH_PART_LEN).collect(),
            ));
        }
        let (hash_part, rest) = s.split_at(HASH_PART_LEN);
        if base32::decode(hash_part.as_bytes()).is_err() {
            return Err(ParseStorePathError::InvalidHash(hash_part.to_owned()));
        }
        let name = rest
            .strip_prefix('-')
            .ok_or(ParseStorePathError::MissingDash)?;
        validate_name(name)?;

        Ok(StorePath {
            hash_part: hash_part.to_owned(),
            name: name.to_owned(),
        })
    }

    pub fn hash_part(&self) -> &str {
        &self.hash_part
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn validate_name(name: &str) -> Result<(), ParseStorePathError> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(ParseStorePathError::InvalidNameLength);
    }
    for (position, c) in name.bytes().enumerate() {
        if c.is_ascii_alphanumeric()
            || (c == b'.' && position != 0) // can't start with a dot
            || matches!(c, b'-' | b'_' | b'+' | b'?' | b'=')
        {
            continue;
        }
        return Err(ParseStorePathError::InvalidName {
            name: name.to_owned(),
            position,
        });
    }
    Ok(())
}

/// The directory store paths are printed relative to, e.g. `/nix/store`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreDir(String);

impl StoreDir {
    pub fn new(dir: impl Into<String>) -> StoreDir {
        let mut dir = dir.into();
        while dir.len() > 1 && dir.ends_with('/') {
            dir.pop();
        }
        StoreDir(dir)
    }

    pub fn print(&self, path: &StorePath) -> String {
        format!("{}/{path}", self.0)
    }

    /// Inverse of [`StoreDir::print`].
    pub fn parse(&self, s: &str) -> Result<StorePath, ParseStorePathError> {
        let base_name = s
            .strip_prefix(self.0.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| ParseStorePathError::NotInStore(self.0.clone()))?;
        if base_name.contains('/') {
            return Err(ParseStorePathError::NestedPath);
        }
        StorePath::from_base_name(base_name)
    }
}

impl Default for StoreDir {
    fn default() -> Self {
        StoreDir::new("/nix/store")
    }
}

impl fmt::Display for StoreDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
