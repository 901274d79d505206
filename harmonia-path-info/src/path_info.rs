// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

use std::collections::BTreeSet;

use harmonia_store_db::ValidPathInfo;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::hash::{Hash, HashFormat};
use crate::store_path::{StoreDir, StorePath};

/// One JSON object of the machine-readable report.
pub type Document = Map<String, Value>;

/// Metadata of a valid store path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathInfo {
    pub path: StorePath,
    pub nar_hash: Hash,
    /// Size of the NAR serialisation in bytes
    pub nar_size: u64,
    pub references: BTreeSet<StorePath>,
    pub deriver: Option<StorePath>,
    /// Seconds since the epoch, zero when unknown
    pub registration_time: i64,
    /// Built locally rather than obtained from a substituter
    pub ultimate: bool,
    pub signatures: Vec<String>,
    /// Rendered content address, e.g. `fixed:r:sha256:...`
    pub ca: Option<String>,
}

/// Aggregate sizes over the closure of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClosureSize {
    /// Sum of the NAR sizes of every closure member
    pub nar_size: u64,
    /// Sum of the compressed download sizes; zero for stores without NAR files
    pub download_size: u64,
}

impl PathInfo {
    /// Convert a metadata index row, parsing the paths it mentions.
    pub fn from_db(store_dir: &StoreDir, row: ValidPathInfo) -> Result<PathInfo> {
        let parse = |s: &str| {
            store_dir.parse(s).map_err(|reason| Error::InvalidPath {
                path: s.to_owned(),
                reason,
            })
        };

        let path = parse(&row.path)?;
        let nar_hash = row.hash.parse().map_err(|reason| Error::InvalidHash {
            path: row.path.clone(),
            reason,
        })?;
        let references = row
            .references
            .iter()
            .map(|r| parse(r))
            .collect::<Result<BTreeSet<_>>>()?;
        let deriver = row.deriver.as_deref().map(parse).transpose()?;

        Ok(PathInfo {
            path,
            nar_hash,
            nar_size: row.nar_size.unwrap_or(0),
            references,
            deriver,
            registration_time: row.registration_unix_time(),
            ultimate: row.ultimate,
            signatures: row.signatures().into_iter().map(str::to_owned).collect(),
            ca: row.ca,
        })
    }

    /// Serialise the way the store reports path info. The `path` key is left
    /// to the caller, which knows how the store prints it.
    ///
    /// Impure info covers the fields that differ between stores holding the
    /// same path: deriver, registration time, trust and signatures.
    pub fn to_json(
        &self,
        store_dir: &StoreDir,
        include_impure_info: bool,
        hash_format: HashFormat,
    ) -> Document {
        let mut doc = Document::new();
        doc.insert("narHash".into(), self.nar_hash.render(hash_format).into());
        doc.insert("narSize".into(), self.nar_size.into());
        doc.insert(
            "references".into(),
            self.references
                .iter()
                .map(|r| store_dir.print(r))
                .collect::<Value>(),
        );
        if let Some(ca) = &self.ca {
            doc.insert("ca".into(), ca.clone().into());
        }

        if include_impure_info {
            if let Some(deriver) = &self.deriver {
                doc.insert("deriver".into(), store_dir.print(deriver).into());
            }
            if self.registration_time != 0 {
                doc.insert("registrationTime".into(), self.registration_time.into());
            }
            doc.insert("ultimate".into(), self.ultimate.into());
            doc.insert("signatures".into(), self.signatures.clone().into());
        }

        doc
    }
}

#[cfg(test)]
mod tests {
    use std::time::UNIX_EPOCH;

    use serde_json::json;

    use super::*;

    const HASH: &str = "sha256:ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    fn path(c: char, name: &str) -> String {
        format!("/nix/store/{}-{name}", c.to_string().repeat(32))
    }

    fn row() -> ValidPathInfo {
        ValidPathInfo {
            id: 7,
            path: path('a', "hello"),
            hash: HASH.into(),
            registration_time: UNIX_EPOCH,
            deriver: Some(path('d', "hello.drv")),
            nar_size: Some(2048),
            ultimate: true,
            sigs: Some("cache:sig1 other:sig2".into()),
            ca: None,
            references: [path('b', "glibc"), path('a', "hello")].into(),
        }
    }

    #[test]
    fn test_from_db() {
        let store = StoreDir::default();
        let info = PathInfo::from_db(&store, row()).unwrap();
        assert_eq!(store.print(&info.path), path('a', "hello"));
        assert_eq!(info.nar_size, 2048);
        assert_eq!(info.references.len(), 2);
        assert_eq!(info.signatures, vec!["cache:sig1", "other:sig2"]);
        assert_eq!(info.registration_time, 0);
    }

    #[test]
    fn test_from_db_rejects_foreign_reference() {
        let mut row = row();
        row.references.insert("/gnu/store/whatever".into());
        assert!(matches!(
            PathInfo::from_db(&StoreDir::default(), row),
            Err(Error::InvalidPath { path, .. }) if path == "/gnu/store/whatever"
        ));
    }

    #[test]
    fn test_from_db_rejects_bad_hash() {
        let mut row = row();
        row.hash = "sha256:nothex".into();
        assert!(matches!(
            PathInfo::from_db(&StoreDir::default(), row),
            Err(Error::InvalidHash { .. })
        ));
    }

    #[test]
    fn test_to_json_pure_and_impure() {
        let store = StoreDir::default();
        let info = PathInfo::from_db(&store, row()).unwrap();

        let pure = info.to_json(&store, false, HashFormat::Base16);
        assert_eq!(
            Value::Object(pure),
            json!({
                "narHash": HASH,
                "narSize": 2048,
                "references": [path('a', "hello"), path('b', "glibc")],
            })
        );

        let impure = info.to_json(&store, true, HashFormat::Sri);
        assert_eq!(
            impure["narHash"],
            json!("sha256-ungWv48Bz+pBQUDeXa4iI7ADYaOWF3qctBD/YfIAFa0=")
        );
        assert_eq!(impure["deriver"], json!(path('d', "hello.drv")));
        assert_eq!(impure["ultimate"], json!(true));
        assert_eq!(impure["signatures"], json!(["cache:sig1", "other:sig2"]));
        assert!(!impure.contains_key("registrationTime"));
        assert!(!impure.contains_key("ca"));
    }
}
