// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{ConfigError, Result};

fn default_store_dir() -> String {
    "/nix/store".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("/nix/var/nix").join(harmonia_store_db::DB_RELATIVE_PATH)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// SQLite metadata index of the store
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Binary caches to check for `--filter-substitutable`, e.g.
    /// `file:///var/cache/nix`
    #[serde(default)]
    pub substituters: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            db_path: default_db_path(),
            substituters: Vec::new(),
        }
    }
}

impl Config {
    pub fn parse(contents: &str) -> std::result::Result<Config, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_file(path: &Path) -> Result<Config> {
        let contents = read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Config::parse(&contents)?)
    }

    /// Apply `NIX_STORE_DIR` and `NIX_STATE_DIR` the way Nix does.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(store_dir) = lookup("NIX_STORE_DIR") {
            self.store_dir = store_dir;
        }
        if let Some(state_dir) = lookup("NIX_STATE_DIR") {
            self.db_path = Path::new(&state_dir).join(harmonia_store_db::DB_RELATIVE_PATH);
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !self.store_dir.starts_with('/') {
            return Err(ConfigError::Invalid {
                reason: format!("store_dir must be an absolute path, got '{}'", self.store_dir),
            });
        }
        Ok(())
    }
}

/// Load the configuration from `path`, or use defaults; then apply the
/// environment.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            Config::from_file(path)?
        }
        None => Config::default(),
    };
    config.apply_env(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}
