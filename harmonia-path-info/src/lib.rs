// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Size, closure size and signature reports about store paths.
//!
//! Paths are looked up in the store's SQLite metadata index and, for
//! `--filter-substitutable`, in the configured binary caches.
//!
//! # Example
//!
//! ```ignore
//! use harmonia_path_info::{LocalStore, PathInfoReporter, ReportRequest, StoreDir};
//! use harmonia_store_db::StoreDb;
//!
//! let db = StoreDb::open_system_at("/nix/var/nix/db/db.sqlite")?;
//! let store = LocalStore::new(StoreDir::default(), db);
//! let request = ReportRequest { show_size: true, human_readable: true, ..Default::default() };
//! let paths = harmonia_path_info::select_paths(&store, &args, false, false)?;
//! PathInfoReporter::new(&store, request).run(&paths, &mut std::io::stdout())?;
//! ```

pub mod base32;
pub mod config;
pub mod error;
pub mod hash;
pub mod local_store;
pub mod path_info;
pub mod report;
pub mod select;
pub mod size;
pub mod store;
pub mod store_path;
pub mod substituter;

pub use config::Config;
pub use error::{ConfigError, Error, Result};
pub use hash::{Hash, HashFormat};
pub use local_store::LocalStore;
pub use path_info::{ClosureSize, Document, PathInfo};
pub use report::{PathInfoReporter, ReportRequest};
pub use select::select_paths;
pub use size::format_size;
pub use store::{Store, ValidityPolicy};
pub use store_path::{StoreDir, StorePath};
pub use substituter::{FileBinaryCache, Substituter, open_substituter};
