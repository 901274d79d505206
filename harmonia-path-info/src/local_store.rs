// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

use std::collections::BTreeSet;

use harmonia_store_db::StoreDb;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::hash::HashFormat;
use crate::path_info::{ClosureSize, Document, PathInfo};
use crate::store::{Store, ValidityPolicy, path_document};
use crate::store_path::{StoreDir, StorePath};
use crate::substituter::Substituter;

/// Lift the database's missing-root error to the store's own.
fn path_not_found(e: harmonia_store_db::Error) -> Error {
    match e {
        harmonia_store_db::Error::PathNotFound(p) => Error::PathNotFound(p),
        e => Error::StoreDb(e),
    }
}

/// A store backed by a local metadata index and a list of substituters.
pub struct LocalStore {
    store_dir: StoreDir,
    db: StoreDb,
    substituters: Vec<Box<dyn Substituter>>,
}

impl LocalStore {
    pub fn new(store_dir: StoreDir, db: StoreDb) -> LocalStore {
        LocalStore {
            store_dir,
            db,
            substituters: Vec::new(),
        }
    }

    /// Consult `substituters` in ascending priority.
    pub fn with_substituters(mut self, mut substituters: Vec<Box<dyn Substituter>>) -> LocalStore {
        substituters.sort_by_key(|s| s.priority());
        self.substituters = substituters;
        self
    }

    fn parse_db_paths<I: IntoIterator<Item = String>>(&self, paths: I) -> Result<Vec<StorePath>> {
        paths
            .into_iter()
            .map(|p| self.parse_store_path(&p))
            .collect()
    }
}

impl Store for LocalStore {
    fn store_dir(&self) -> &StoreDir {
        &self.store_dir
    }

    fn query_path_info(&self, path: &StorePath) -> Result<PathInfo> {
        let printed = self.print_store_path(path);
        match self.db.query_path_info(&printed)? {
            Some(row) => PathInfo::from_db(&self.store_dir, row),
            None => Err(Error::PathNotFound(printed)),
        }
    }

    fn query_substitutable_paths(&self, paths: &BTreeSet<StorePath>) -> BTreeSet<StorePath> {
        let mut found = BTreeSet::new();

        for sub in &self.substituters {
            if sub.store_dir() != &self.store_dir {
                debug!(
                    "skipping substituter {}: it serves {}",
                    sub.uri(),
                    sub.store_dir()
                );
                continue;
            }
            if !sub.want_mass_query() {
                debug!("skipping substituter {}: no mass queries", sub.uri());
                continue;
            }

            for path in paths {
                if found.contains(path) {
                    continue;
                }
                match sub.is_valid_path(path) {
                    Ok(true) => {
                        found.insert(path.clone());
                    }
                    Ok(false) => {}
                    Err(e) => warn!(
                        "could not query '{}' in {}: {e}",
                        self.print_store_path(path),
                        sub.uri()
                    ),
                }
            }
        }

        debug!("{} of {} paths are substitutable", found.len(), paths.len());
        found
    }

    fn get_closure_size(&self, path: &StorePath) -> Result<ClosureSize> {
        let printed = self.print_store_path(path);
        let nar_size = self.db.query_closure_size(&printed).map_err(path_not_found)?;
        Ok(ClosureSize {
            nar_size,
            download_size: 0,
        })
    }

    fn query_closure(&self, path: &StorePath) -> Result<BTreeSet<StorePath>> {
        let printed = self.print_store_path(path);
        let closure = self.db.query_closure(&printed).map_err(path_not_found)?;
        Ok(self.parse_db_paths(closure)?.into_iter().collect())
    }

    fn query_all_valid_paths(&self) -> Result<Vec<StorePath>> {
        self.parse_db_paths(self.db.query_all_valid_paths()?)
    }

    /// Fetches the metadata of every path in one index lookup.
    fn path_info_to_json(
        &self,
        paths: &BTreeSet<StorePath>,
        include_impure_info: bool,
        include_closure_size: bool,
        hash_format: HashFormat,
        validity: ValidityPolicy,
    ) -> Result<Vec<Document>> {
        let printed: Vec<String> = paths.iter().map(|p| self.print_store_path(p)).collect();
        let mut rows = self
            .db
            .query_path_infos(printed.iter().map(String::as_str))?;

        let mut docs = Vec::with_capacity(paths.len());
        for (path, printed) in paths.iter().zip(&printed) {
            let info = rows
                .remove(printed)
                .map(|row| PathInfo::from_db(&self.store_dir, row))
                .transpose()?;
            docs.push(path_document(
                self,
                path,
                info,
                include_impure_info,
                include_closure_size,
                hash_format,
                validity,
            )?);
        }
        Ok(docs)
    }
}
