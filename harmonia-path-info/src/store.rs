// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! The query interface reports are built from.

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{Error, Result};
use crate::hash::HashFormat;
use crate::path_info::{ClosureSize, Document, PathInfo};
use crate::store_path::{StoreDir, StorePath};

/// What to do with requested paths the store does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityPolicy {
    /// Emit `{"path": ..., "valid": false}` for them
    AllowInvalid,
    /// Fail with [`Error::PathNotFound`]
    DisallowInvalid,
}

/// A store that can answer metadata queries about its paths.
///
/// All calls block; implementations may talk to databases or caches.
pub trait Store {
    fn store_dir(&self) -> &StoreDir;

    fn print_store_path(&self, path: &StorePath) -> String {
        self.store_dir().print(path)
    }

    /// Fails with [`Error::InvalidPath`] on malformed input.
    fn parse_store_path(&self, s: &str) -> Result<StorePath> {
        self.store_dir()
            .parse(s)
            .map_err(|reason| Error::InvalidPath {
                path: s.to_owned(),
                reason,
            })
    }

    /// Fails with [`Error::PathNotFound`] if the path is not valid.
    fn query_path_info(&self, path: &StorePath) -> Result<PathInfo>;

    /// The subset of `paths` some configured substituter can provide.
    ///
    /// Best-effort: unreachable or broken substituters count as not having
    /// the path.
    fn query_substitutable_paths(&self, paths: &BTreeSet<StorePath>) -> BTreeSet<StorePath>;

    fn get_closure_size(&self, path: &StorePath) -> Result<ClosureSize>;

    /// `path` and everything it references, transitively.
    fn query_closure(&self, path: &StorePath) -> Result<BTreeSet<StorePath>>;

    fn query_all_valid_paths(&self) -> Result<Vec<StorePath>>;

    /// One document per path, in set order.
    fn path_info_to_json(
        &self,
        paths: &BTreeSet<StorePath>,
        include_impure_info: bool,
        include_closure_size: bool,
        hash_format: HashFormat,
        validity: ValidityPolicy,
    ) -> Result<Vec<Document>> {
        debug!("Building documents for {} paths", paths.len());
        let mut docs = Vec::with_capacity(paths.len());

        for path in paths {
            let info = match self.query_path_info(path) {
                Ok(info) => Some(info),
                Err(Error::PathNotFound(_)) => None,
                Err(e) => return Err(e),
            };
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

/// The document for `path`, given its info or `None` if it is not valid.
pub(crate) fn path_document<S: Store + ?Sized>(
    store: &S,
    path: &StorePath,
    info: Option<PathInfo>,
    include_impure_info: bool,
    include_closure_size: bool,
    hash_format: HashFormat,
    validity: ValidityPolicy,
) -> Result<Document> {
    let printed = store.print_store_path(path);
    let Some(info) = info else {
        return match validity {
            ValidityPolicy::AllowInvalid => {
                let mut doc = Document::new();
                doc.insert("path".into(), printed.into());
                doc.insert("valid".into(), false.into());
                Ok(doc)
            }
            ValidityPolicy::DisallowInvalid => Err(Error::PathNotFound(printed)),
        };
    };

    let mut doc = info.to_json(store.store_dir(), include_impure_info, hash_format);
    doc.insert("path".into(), printed.into());
    if include_closure_size {
        let sizes = store.get_closure_size(path)?;
        doc.insert("closureSize".into(), sizes.nar_size.into());
    }
    Ok(doc)
}
