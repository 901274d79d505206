// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Filling fixture indexes.

use std::collections::BTreeSet;
use std::time::SystemTime;

use rusqlite::{OptionalExtension, params};

use crate::connection::StoreDb;
use crate::error::Result;
use crate::types::system_time_to_unix;

/// A `ValidPaths` row to insert, with the references to record for it.
#[derive(Debug, Clone)]
pub struct RegisterPathParams {
    pub path: String,
    /// `<algo>:<base16>`
    pub hash: String,
    pub registration_time: SystemTime,
    pub deriver: Option<String>,
    pub nar_size: Option<u64>,
    pub ultimate: bool,
    /// Space-separated signatures
    pub sigs: Option<String>,
    pub ca: Option<String>,
    /// Unregistered paths are skipped
    pub references: BTreeSet<String>,
}

impl Default for RegisterPathParams {
    fn default() -> Self {
        Self {
            path: String::new(),
            hash: String::new(),
            registration_time: SystemTime::now(),
            deriver: None,
            nar_size: None,
            ultimate: false,
            sigs: None,
            ca: None,
            references: BTreeSet::new(),
        }
    }
}

impl StoreDb {
    /// Insert `params` and its references, returning the new row ID.
    pub fn register_valid_path(&mut self, params: &RegisterPathParams) -> Result<i64> {
        let tx = self.conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO ValidPaths (path, hash, registrationTime, deriver, narSize, ultimate, sigs, ca)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                params.path,
                params.hash,
                system_time_to_unix(params.registration_time),
                params.deriver,
                params.nar_size.map(|n| n as i64),
                if params.ultimate { 1 } else { 0 },
                params.sigs,
                params.ca,
            ],
        )?;
        let id = tx.last_insert_rowid();

        for reference in &params.references {
            let ref_id: Option<i64> = tx
                .query_row(
                    "SELECT id FROM ValidPaths WHERE path = ?1",
                    params![reference],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(ref_id) = ref_id {
                tx.execute(
                    "INSERT OR REPLACE INTO Refs (referrer, reference) VALUES (?1, ?2)",
                    params![id, ref_id],
                )?;
            }
        }

        tx.commit()?;
        Ok(id)
    }

    /// Record a reference between registered paths, such as one that closes
    /// a cycle.
    pub fn add_reference(&self, referrer_path: &str, reference_path: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO Refs (referrer, reference)
            SELECT r.id, f.id
            FROM ValidPaths r, ValidPaths f
            WHERE r.path = ?1 AND f.path = ?2
            "#,
            params![referrer_path, reference_path],
        )?;
        Ok(())
    }
}
