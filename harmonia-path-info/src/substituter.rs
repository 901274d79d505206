// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Binary caches paths can be substituted from.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::{IoErrorContext, Result};
use crate::store_path::{StoreDir, StorePath};

/// Priority of caches that do not announce one.
pub const DEFAULT_PRIORITY: u32 = 50;

/// A source of pre-built store paths.
pub trait Substituter {
    fn uri(&self) -> &str;

    /// Store directory the cache's paths belong to.
    fn store_dir(&self) -> &StoreDir;

    /// Whether the cache may be asked about many paths at once.
    fn want_mass_query(&self) -> bool;

    /// Lower is preferred.
    fn priority(&self) -> u32;

    fn is_valid_path(&self, path: &StorePath) -> Result<bool>;
}

/// Contents of a cache's `nix-cache-info` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheInfo {
    pub store_dir: StoreDir,
    pub want_mass_query: bool,
    pub priority: u32,
}

impl CacheInfo {
    pub fn new(store_dir: StoreDir) -> CacheInfo {
        CacheInfo {
            store_dir,
            want_mass_query: true,
            priority: DEFAULT_PRIORITY,
        }
    }

    /// Parse `Key: value` lines; unknown keys are ignored.
    pub fn parse(text: &str, default_store_dir: &StoreDir) -> CacheInfo {
        let mut info = CacheInfo::new(default_store_dir.clone());
        for line in text.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "StoreDir" => info.store_dir = StoreDir::new(value),
                "WantMassQuery" => info.want_mass_query = value == "1",
                "Priority" => match value.parse() {
                    Ok(priority) => info.priority = priority,
                    Err(_) => warn!("ignoring invalid cache priority '{value}'"),
                },
                _ => {}
            }
        }
        info
    }
}

/// A binary cache in a local directory, addressed as `file:///dir`.
#[derive(Debug)]
pub struct FileBinaryCache {
    uri: String,
    dir: PathBuf,
    info: CacheInfo,
}

impl FileBinaryCache {
    /// Open the cache at `dir`. Without a `nix-cache-info` file the cache is
    /// assumed to serve `default_store_dir`.
    pub fn open(dir: impl Into<PathBuf>, default_store_dir: &StoreDir) -> Result<FileBinaryCache> {
        let dir = dir.into();
        let info_path = dir.join("nix-cache-info");
        let info = match fs::read_to_string(&info_path) {
            Ok(text) => CacheInfo::parse(&text, default_store_dir),
            Err(e) if e.kind() == ErrorKind::NotFound => CacheInfo::new(default_store_dir.clone()),
            Err(e) => {
                return Err(e).io_context(format!("Failed to read {}", info_path.display()));
            }
        };
        debug!("Opened binary cache at {} ({info:?})", dir.display());

        Ok(FileBinaryCache {
            uri: format!("file://{}", dir.display()),
            dir,
            info,
        })
    }

    fn narinfo_path(&self, path: &StorePath) -> PathBuf {
        self.dir.join(format!("{}.narinfo", path.hash_part()))
    }
}

impl Substituter for FileBinaryCache {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn store_dir(&self) -> &StoreDir {
        &self.info.store_dir
    }

    fn want_mass_query(&self) -> bool {
        self.info.want_mass_query
    }

    fn priority(&self) -> u32 {
        self.info.priority
    }

    fn is_valid_path(&self, path: &StorePath) -> Result<bool> {
        let narinfo = self.narinfo_path(path);
        match fs::metadata(&narinfo) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).io_context(format!("Failed to stat {}", narinfo.display())),
        }
    }
}

/// Open the substituter named by `uri`.
///
/// Only `file://` caches are supported; anything else is skipped with a
/// warning and yields `None`.
pub fn open_substituter(uri: &str, store_dir: &StoreDir) -> Result<Option<Box<dyn Substituter>>> {
    match uri.strip_prefix("file://") {
        Some(dir) => Ok(Some(Box::new(FileBinaryCache::open(dir, store_dir)?))),
        None => {
            warn!("ignoring unsupported substituter '{uri}'");
            Ok(None)
        }
    }
}
