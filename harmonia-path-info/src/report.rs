// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Tabular and JSON reports over store path metadata.
//!
//! The two output modes deliberately query the store differently: JSON
//! output builds all documents in one batched call, while the table queries
//! every path on its own and stops at the first path that is not valid.
//!
//! `--filter-substitutable` is asymmetric as well. The table *drops* paths
//! that a substituter can provide, leaving only what would have to be built
//! or copied by hand; JSON output keeps every path and adds a
//! `substitutable` boolean instead.

use std::collections::BTreeSet;
use std::io::Write;

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, IoErrorContext, Result};
use crate::hash::HashFormat;
use crate::path_info::{Document, PathInfo};
use crate::size::format_size;
use crate::store::{Store, ValidityPolicy};
use crate::store_path::StorePath;

/// Which columns and which output mode a report uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportRequest {
    pub show_size: bool,
    pub show_closure_size: bool,
    pub human_readable: bool,
    pub show_sigs: bool,
    pub show_sub_status: bool,
    pub json: bool,
}

impl ReportRequest {
    /// Whether any column follows the path, so that paths need padding.
    pub fn has_columns(&self) -> bool {
        self.show_size || self.show_closure_size || self.show_sigs
    }
}

/// Width of the path column: the longest printed path among `paths`.
///
/// Computed over the requested paths before any filtering so that the
/// layout does not depend on what is filtered out.
pub fn alignment_width<S: Store + ?Sized>(store: &S, paths: &[StorePath]) -> usize {
    paths
        .iter()
        .map(|p| store.print_store_path(p).len())
        .max()
        .unwrap_or(0)
}

/// The paths of `paths` that are not in `substitutable`, in request order,
/// each at most once.
pub fn filter_substitutable(
    paths: &[StorePath],
    substitutable: &BTreeSet<StorePath>,
) -> Vec<StorePath> {
    let mut seen = BTreeSet::new();
    paths
        .iter()
        .filter(|p| !substitutable.contains(*p) && seen.insert(*p))
        .cloned()
        .collect()
}

/// `ultimate`, then `ca:<content address>`, then the signatures, space
/// separated.
pub fn render_signatures(info: &PathInfo) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(info.signatures.len() + 2);
    if info.ultimate {
        parts.push("ultimate".to_owned());
    }
    if let Some(ca) = &info.ca {
        parts.push(format!("ca:{ca}"));
    }
    parts.extend(info.signatures.iter().cloned());
    parts.join(" ")
}

pub struct PathInfoReporter<'a, S: Store + ?Sized> {
    store: &'a S,
    request: ReportRequest,
}

impl<'a, S: Store + ?Sized> PathInfoReporter<'a, S> {
    pub fn new(store: &'a S, request: ReportRequest) -> Self {
        Self { store, request }
    }

    /// Write the report for `paths` to `out`.
    pub fn run<W: Write>(&self, paths: &[StorePath], out: &mut W) -> Result<()> {
        let width = alignment_width(self.store, paths);

        let substitutable = if self.request.show_sub_status {
            let requested: BTreeSet<StorePath> = paths.iter().cloned().collect();
            self.store.query_substitutable_paths(&requested)
        } else {
            BTreeSet::new()
        };

        if self.request.json {
            let docs = self.build_documents(paths, &substitutable)?;
            serde_json::to_writer(&mut *out, &docs)?;
            writeln!(out).io_context("Failed to write report")?;
            return Ok(());
        }

        let displayed = if self.request.show_sub_status {
            let missing = filter_substitutable(paths, &substitutable);
            debug!(
                "{} of {} paths are not substitutable",
                missing.len(),
                paths.len()
            );
            missing
        } else {
            paths.to_vec()
        };

        for path in &displayed {
            let row = self.render_row(path, width)?;
            out.write_all(row.as_bytes())
                .io_context("Failed to write report")?;
        }
        Ok(())
    }

    /// Documents for every requested path, annotated with `substitutable`
    /// when substitutability was requested.
    pub fn build_documents(
        &self,
        paths: &[StorePath],
        substitutable: &BTreeSet<StorePath>,
    ) -> Result<Vec<Document>> {
        let requested: BTreeSet<StorePath> = paths.iter().cloned().collect();
        let mut docs = self.store.path_info_to_json(
            &requested,
            true,
            self.request.show_closure_size,
            HashFormat::Sri,
            ValidityPolicy::AllowInvalid,
        )?;

        if self.request.show_sub_status {
            for doc in &mut docs {
                let printed = doc
                    .get("path")
                    .and_then(Value::as_str)
                    .ok_or_else(|| Error::Internal("document without a path".to_owned()))?;
                let path = self.store.parse_store_path(printed).map_err(|e| {
                    Error::Internal(format!("document path does not parse: {e}"))
                })?;
                doc.insert(
                    "substitutable".into(),
                    substitutable.contains(&path).into(),
                );
            }
        }

        Ok(docs)
    }

    /// One line of the table, newline included.
    pub fn render_row(&self, path: &StorePath, width: usize) -> Result<String> {
        let info = self.store.query_path_info(path)?;
        let printed = self.store.print_store_path(&info.path);

        let mut row = printed.clone();
        if self.request.has_columns() {
            row.push_str(&" ".repeat(width.saturating_sub(printed.len())));
        }
        if self.request.show_size {
            row.push_str(&format_size(info.nar_size, self.request.human_readable));
        }
        if self.request.show_closure_size {
            let closure = self.store.get_closure_size(&info.path)?;
            row.push_str(&format_size(closure.nar_size, self.request.human_readable));
        }
        if self.request.show_sigs {
            row.push('\t');
            row.push_str(&render_signatures(&info));
        }
        row.push('\n');
        Ok(row)
    }
}
