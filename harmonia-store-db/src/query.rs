// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Read queries against the store metadata index.

use std::collections::{BTreeMap, BTreeSet};

use rusqlite::{OptionalExtension, Row, params};
use tracing::debug;

use crate::connection::StoreDb;
use crate::error::{Error, Result};
use crate::types::{ValidPathInfo, unix_to_system_time};

/// Closure of a path, following Refs transitively. `UNION` keeps every
/// member once, so shared dependencies and reference cycles terminate.
const CLOSURE_CTE: &str = r#"
WITH RECURSIVE closure(id) AS (
    SELECT id FROM ValidPaths WHERE path = ?1
    UNION
    SELECT r.reference FROM Refs r JOIN closure c ON r.referrer = c.id
)
"#;

fn info_from_row(row: &Row<'_>) -> rusqlite::Result<ValidPathInfo> {
    Ok(ValidPathInfo {
        id: row.get(0)?,
        path: row.get(1)?,
        hash: row.get(2)?,
        registration_time: unix_to_system_time(row.get(3)?),
        deriver: row.get(4)?,
        nar_size: row.get::<_, Option<i64>>(5)?.map(|n| n as u64),
        // NULL means "false"
        ultimate: row.get::<_, Option<i32>>(6)?.unwrap_or(0) != 0,
        sigs: row.get(7)?,
        ca: row.get(8)?,
        references: BTreeSet::new(),
    })
}

impl StoreDb {
    /// Query path info by full store path.
    ///
    /// Returns `None` if the path is not in the database.
    pub fn query_path_info(&self, path: &str) -> Result<Option<ValidPathInfo>> {
        let mut stmt = self.conn.prepare_cached(
            r#"
            SELECT id, path, hash, registrationTime, deriver, narSize, ultimate, sigs, ca
            FROM ValidPaths
            WHERE path = ?1
            "#,
        )?;

        match stmt.query_row(params![path], info_from_row).optional()? {
            Some(mut info) => {
                info.references = self.query_references_by_id(info.id)?;
                Ok(Some(info))
            }
            None => Ok(None),
        }
    }

    /// Query path info for many paths at once.
    ///
    /// Paths the database does not know are absent from the result.
    pub fn query_path_infos<'a, I>(&self, paths: I) -> Result<BTreeMap<String, ValidPathInfo>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut infos = BTreeMap::new();
        let mut requested = 0usize;
        for path in paths {
            requested += 1;
            if let Some(info) = self.query_path_info(path)? {
                infos.insert(info.path.clone(), info);
            }
        }
        debug!("Queried {} of {} paths", infos.len(), requested);
        Ok(infos)
    }

    pub fn is_valid_path(&self, path: &str) -> Result<bool> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT 1 FROM ValidPaths WHERE path = ?1 LIMIT 1")?;
        Ok(stmt.query_row(params![path], |_| Ok(())).optional()?.is_some())
    }

    fn query_references_by_id(&self, id: i64) -> Result<BTreeSet<String>> {
        let mut stmt = self.conn.prepare_cached(
            r#"
            SELECT v.path
            FROM Refs r
            JOIN ValidPaths v ON r.reference = v.id
            WHERE r.referrer = ?1
            "#,
        )?;

        let refs = stmt
            .query_map(params![id], |row| row.get(0))?
            .collect::<rusqlite::Result<BTreeSet<String>>>()?;
        Ok(refs)
    }

    /// All paths reachable from `path` through references, `path` included.
    pub fn query_closure(&self, path: &str) -> Result<BTreeSet<String>> {
        if !self.is_valid_path(path)? {
            return Err(Error::PathNotFound(path.to_owned()));
        }

        let sql = format!(
            "{CLOSURE_CTE} SELECT v.path FROM ValidPaths v JOIN closure c ON v.id = c.id"
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let closure = stmt
            .query_map(params![path], |row| row.get(0))?
            .collect::<rusqlite::Result<BTreeSet<String>>>()?;
        Ok(closure)
    }

    /// Sum of the NAR sizes over the closure of `path`.
    ///
    /// Paths registered without a NAR size count as zero.
    pub fn query_closure_size(&self, path: &str) -> Result<u64> {
        if !self.is_valid_path(path)? {
            return Err(Error::PathNotFound(path.to_owned()));
        }

        let sql = format!(
            "{CLOSURE_CTE} SELECT COALESCE(SUM(v.narSize), 0) FROM ValidPaths v JOIN closure c ON v.id = c.id"
        );
        let total: i64 = self
            .conn
            .prepare_cached(&sql)?
            .query_row(params![path], |row| row.get(0))?;
        Ok(total as u64)
    }

    /// Every valid path, in path order.
    ///
    /// Warning: This can be slow for large stores!
    pub fn query_all_valid_paths(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT path FROM ValidPaths ORDER BY path")?;
        let paths = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(paths)
    }
}
