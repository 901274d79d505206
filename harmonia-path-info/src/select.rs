// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Turning command-line arguments into the list of paths to report on.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{IoErrorContext, Result};
use crate::store::Store;
use crate::store_path::StorePath;

/// Parse `arg` as a store path. A symlink into the store (such as a
/// `result` link) is followed once.
pub fn resolve_path_arg<S: Store + ?Sized>(store: &S, arg: &str) -> Result<StorePath> {
    let err = match store.parse_store_path(arg) {
        Ok(path) => return Ok(path),
        Err(err) => err,
    };

    let link = Path::new(arg);
    let is_symlink = fs::symlink_metadata(link)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false);
    if !is_symlink {
        return Err(err);
    }

    let target = fs::read_link(link).io_context(format!("Failed to read symlink '{arg}'"))?;
    let target = if target.is_relative() {
        link.parent().map(Path::to_path_buf).unwrap_or_default().join(target)
    } else {
        target
    };
    debug!("following {arg} to {}", target.display());
    store.parse_store_path(&target.to_string_lossy())
}

/// What to report on: the given paths, optionally widened to their
/// closures, or every valid path. Each path appears once, first occurrence
/// wins.
pub fn select_paths<S: Store + ?Sized>(
    store: &S,
    args: &[String],
    recursive: bool,
    all: bool,
) -> Result<Vec<StorePath>> {
    let roots = if all {
        store.query_all_valid_paths()?
    } else {
        args.iter()
            .map(|arg| resolve_path_arg(store, arg))
            .collect::<Result<Vec<_>>>()?
    };

    let mut seen = BTreeSet::new();
    let mut selected = Vec::with_capacity(roots.len());
    for root in roots {
        if seen.insert(root.clone()) {
            selected.push(root.clone());
        }
        if recursive {
            for member in store.query_closure(&root)? {
                if seen.insert(member.clone()) {
                    selected.push(member);
                }
            }
        }
    }
    Ok(selected)
}
