// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! End-to-end reports over a scratch metadata index and file binary caches.

use std::fs;
use std::path::Path;

use harmonia_path_info::{
    Error, FileBinaryCache, LocalStore, PathInfoReporter, ReportRequest, Store, StoreDir,
    StorePath, Substituter, select_paths,
};
use harmonia_store_db::{OpenMode, RegisterPathParams, StoreDb};
use rstest::rstest;
use serde_json::{Value, json};
use tempfile::TempDir;

const NAR_HASH: &str = "sha256:ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

const GLIBC: &str = "/nix/store/bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb-glibc";
const HELLO: &str = "/nix/store/aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa-hello-2.12";
const UNRELATED: &str = "/nix/store/cccccccccccccccccccccccccccccccc-bash";
const UNKNOWN: &str = "/nix/store/dddddddddddddddddddddddddddddddd-missing";

struct Fixture {
    dir: TempDir,
    store: LocalStore,
}

fn register(db: &mut StoreDb, path: &str, nar_size: u64, references: &[&str]) {
    db.register_valid_path(&RegisterPathParams {
        path: path.into(),
        hash: NAR_HASH.into(),
        nar_size: Some(nar_size),
        ultimate: path == HELLO,
        sigs: Some("cache.example.org-1:c2ln".into()),
        references: references.iter().map(|r| r.to_string()).collect(),
        ..Default::default()
    })
    .unwrap();
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let mut db = StoreDb::open(dir.path().join("db.sqlite"), OpenMode::Create).unwrap();
    register(&mut db, GLIBC, 1000, &[]);
    register(&mut db, HELLO, 200, &[GLIBC]);
    register(&mut db, UNRELATED, 30, &[]);
    Fixture {
        dir,
        store: LocalStore::new(StoreDir::default(), db),
    }
}

/// A `file://` cache holding narinfos for `paths`.
fn binary_cache(root: &Path, info: &str, paths: &[&str]) -> Box<dyn Substituter> {
    let cache = root.join("cache");
    fs::create_dir_all(&cache).unwrap();
    fs::write(cache.join("nix-cache-info"), info).unwrap();
    for path in paths {
        let hash = &path["/nix/store/".len()..][..32];
        fs::write(cache.join(format!("{hash}.narinfo")), "").unwrap();
    }
    Box::new(FileBinaryCache::open(cache, &StoreDir::default()).unwrap())
}

fn parse(store: &LocalStore, paths: &[&str]) -> Vec<StorePath> {
    paths
        .iter()
        .map(|p| store.parse_store_path(p).unwrap())
        .collect()
}

fn report(store: &LocalStore, request: ReportRequest, paths: &[&str]) -> String {
    let mut out = Vec::new();
    PathInfoReporter::new(store, request)
        .run(&parse(store, paths), &mut out)
        .unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_sizes_table() {
    let Fixture { dir: _dir, store } = fixture();
    let request = ReportRequest {
        show_size: true,
        show_closure_size: true,
        ..Default::default()
    };

    let out = report(&store, request, &[HELLO, GLIBC]);
    let pad = " ".repeat(HELLO.len() - GLIBC.len());
    assert_eq!(
        out,
        format!(
            "{HELLO}\t{:>11}\t{:>11}\n{GLIBC}{pad}\t{:>11}\t{:>11}\n",
            200, 1200, 1000, 1000
        )
    );
}

#[test]
fn test_plain_listing() {
    let Fixture { dir: _dir, store } = fixture();
    let out = report(&store, ReportRequest::default(), &[GLIBC, UNRELATED]);
    assert_eq!(out, format!("{GLIBC}\n{UNRELATED}\n"));
}

#[test]
fn test_sigs_column() {
    let Fixture { dir: _dir, store } = fixture();
    let request = ReportRequest {
        show_sigs: true,
        ..Default::default()
    };
    let out = report(&store, request, &[HELLO]);
    assert_eq!(out, format!("{HELLO}\tultimate cache.example.org-1:c2ln\n"));
}

#[test]
fn test_table_drops_substitutable_paths() {
    let Fixture { dir, store } = fixture();
    let cache = binary_cache(dir.path(), "StoreDir: /nix/store\nWantMassQuery: 1\n", &[HELLO]);
    let store = store.with_substituters(vec![cache]);
    let request = ReportRequest {
        show_size: true,
        show_sub_status: true,
        ..Default::default()
    };

    let out = report(&store, request, &[HELLO, GLIBC]);
    // The column still lines up with the dropped, longer path.
    let pad = " ".repeat(HELLO.len() - GLIBC.len());
    assert_eq!(out, format!("{GLIBC}{pad}\t{:>11}\n", 1000));
}

#[test]
fn test_json_annotates_substitutable_paths() {
    let Fixture { dir, store } = fixture();
    let cache = binary_cache(dir.path(), "StoreDir: /nix/store\n", &[HELLO]);
    let store = store.with_substituters(vec![cache]);
    let request = ReportRequest {
        show_closure_size: true,
        show_sub_status: true,
        json: true,
        ..Default::default()
    };

    let out = report(&store, request, &[HELLO, GLIBC]);
    let docs: Vec<Value> = serde_json::from_str(&out).unwrap();
    assert_eq!(docs.len(), 2);

    let hello = docs.iter().find(|d| d["path"] == HELLO).unwrap();
    assert_eq!(hello["substitutable"], json!(true));
    assert_eq!(hello["closureSize"], json!(1200));
    assert_eq!(hello["narSize"], json!(200));
    assert_eq!(hello["references"], json!([GLIBC]));
    assert_eq!(
        hello["narHash"],
        json!("sha256-ungWv48Bz+pBQUDeXa4iI7ADYaOWF3qctBD/YfIAFa0=")
    );
    assert_eq!(hello["ultimate"], json!(true));
    assert_eq!(hello["signatures"], json!(["cache.example.org-1:c2ln"]));

    let glibc = docs.iter().find(|d| d["path"] == GLIBC).unwrap();
    assert_eq!(glibc["substitutable"], json!(false));
    assert_eq!(glibc["closureSize"], json!(1000));
}

#[rstest]
#[case::foreign_store_dir("StoreDir: /gnu/store\n")]
#[case::no_mass_query("StoreDir: /nix/store\nWantMassQuery: 0\n")]
fn test_ignored_substituter(#[case] info: &str) {
    let Fixture { dir, store } = fixture();
    let cache = binary_cache(dir.path(), info, &[HELLO, GLIBC]);
    let store = store.with_substituters(vec![cache]);
    let request = ReportRequest {
        show_sub_status: true,
        ..Default::default()
    };

    let out = report(&store, request, &[HELLO, GLIBC]);
    assert_eq!(out, format!("{HELLO}\n{GLIBC}\n"));
}

#[test]
fn test_unknown_path_is_fatal_in_table() {
    let Fixture { dir: _dir, store } = fixture();
    let request = ReportRequest {
        show_size: true,
        ..Default::default()
    };

    let mut out = Vec::new();
    let err = PathInfoReporter::new(&store, request)
        .run(&parse(&store, &[GLIBC, UNKNOWN, HELLO]), &mut out)
        .unwrap_err();
    assert!(matches!(err, Error::PathNotFound(p) if p == UNKNOWN));

    let written = String::from_utf8(out).unwrap();
    assert!(written.starts_with(GLIBC));
    assert_eq!(written.lines().count(), 1);
}

#[test]
fn test_unknown_path_is_marked_invalid_in_json() {
    let Fixture { dir: _dir, store } = fixture();
    let request = ReportRequest {
        json: true,
        ..Default::default()
    };

    let out = report(&store, request, &[UNKNOWN]);
    let docs: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(docs, json!([{ "path": UNKNOWN, "valid": false }]));
}

#[test]
fn test_recursive_selection() {
    let Fixture { dir: _dir, store } = fixture();
    let args = vec![HELLO.to_owned(), UNRELATED.to_owned()];

    let selected = select_paths(&store, &args, true, false).unwrap();
    assert_eq!(selected, parse(&store, &[HELLO, GLIBC, UNRELATED]));

    let plain = select_paths(&store, &args, false, false).unwrap();
    assert_eq!(plain, parse(&store, &[HELLO, UNRELATED]));
}

#[test]
fn test_all_selection() {
    let Fixture { dir: _dir, store } = fixture();
    let selected = select_paths(&store, &[], false, true).unwrap();
    assert_eq!(selected, parse(&store, &[HELLO, GLIBC, UNRELATED]));
}

#[test]
fn test_recursive_selection_of_unknown_path_fails() {
    let Fixture { dir: _dir, store } = fixture();
    let err = select_paths(&store, &[UNKNOWN.to_owned()], true, false).unwrap_err();
    assert!(matches!(err, Error::PathNotFound(_)));
}

#[test]
fn test_symlink_argument_is_followed() {
    let Fixture { dir, store } = fixture();
    let link = dir.path().join("result");
    std::os::unix::fs::symlink(HELLO, &link).unwrap();

    let selected = select_paths(&store, &[link.display().to_string()], false, false).unwrap();
    assert_eq!(selected, parse(&store, &[HELLO]));
}

#[test]
fn test_non_store_argument_is_rejected() {
    let Fixture { dir: _dir, store } = fixture();
    let err = select_paths(&store, &["/tmp/not-a-store-path".to_owned()], false, false)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidPath { .. }));
}
