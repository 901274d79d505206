// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! SQLite interface to the Nix store metadata index.
//!
//! Read access to the `ValidPaths` and `Refs` tables of a Nix store
//! database: single and batched path-info lookups, closures and closure
//! sizes. Write helpers exist to build fixture stores in tests.
//!
//! # Example
//!
//! ```ignore
//! use harmonia_store_db::StoreDb;
//!
//! let db = StoreDb::open_system_at("/nix/var/nix/db/db.sqlite")?;
//! if let Some(info) = db.query_path_info("/nix/store/...")? {
//!     println!("NAR size: {}", info.nar_size.unwrap_or(0));
//! }
//! ```

mod connection;
mod error;
mod query;
mod schema;
mod types;
mod write;

pub use connection::{DB_RELATIVE_PATH, OpenMode, StoreDb};
pub use error::{Error, Result};
pub use schema::SCHEMA_VERSION;
pub use types::ValidPathInfo;
pub use write::RegisterPathParams;
