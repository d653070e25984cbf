// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::codec::{Dialect, Record};
use crate::writer::append;
use proptest::prelude::*;
use tempfile::TempDir;

fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

fn save_all(path: &Path, records: &[Record], config: &StoreConfig) {
    for record in records {
        append(path, std::slice::from_ref(record), config).unwrap();
    }
}

fn history() -> Vec<Record> {
    vec![
        Record::new("todos", "a", "{\"name\":\"Alice\"}"),
        Record::new("todos", "b", "{\"name\":\"Bob\"}"),
        Record::new("todos", "c", "{\"name\":\"Carol\"}"),
        Record::new("todos", "a", "{\"name\":\"Alice X.\"}"),
        Record::new("todos", "a", "{\"name\":\"Alice Y.\"}"),
        Record::new("todos", "a", "{\"name\":\"Alice Z.\"}"),
        Record::tombstone("todos", "c"),
    ]
}

#[test]
fn compact_writes_one_sorted_line_per_live_key() {
    let dir = temp_dir();
    let source = dir.path().join("source.pott");
    let dest = dir.path().join("dest.pott");
    let config = StoreConfig::default();
    save_all(&source, &history(), &config);

    let result = compact(&source, &dest, &config).unwrap();

    assert_eq!(result.lines_before, 7);
    assert_eq!(result.lines_after, 2);
    assert_eq!(result.lines_removed(), 5);
    assert_eq!(
        std::fs::read_to_string(&dest).unwrap(),
        "todos a {\"name\":\"Alice Z.\"}\ntodos b {\"name\":\"Bob\"}\n"
    );
}

#[test]
fn compact_in_place() {
    let dir = temp_dir();
    let path = dir.path().join("log.pott");
    let config = StoreConfig::default();
    save_all(&path, &history(), &config);
    let before = LogReader::new(&path, config.dialect).replay().unwrap();

    compact(&path, &path, &config).unwrap();

    let after = LogReader::new(&path, config.dialect).replay().unwrap();
    assert_eq!(after.state, before.state);
    assert_eq!(after.line_count, before.state.len() as u64);
    assert!(!temp_path(&path).exists());
}

#[test]
fn compact_is_idempotent() {
    let dir = temp_dir();
    let path = dir.path().join("log.pott");
    let config = StoreConfig::transactional();
    save_all(
        &path,
        &[
            Record::new("user", "2", "bob"),
            Record::new("user", "1", "alice"),
            Record::new("group", "x", "admins and friends"),
            Record::tombstone("user", "2"),
        ],
        &config,
    );

    compact(&path, &path, &config).unwrap();
    let first = std::fs::read(&path).unwrap();
    compact(&path, &path, &config).unwrap();
    let second = std::fs::read(&path).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        String::from_utf8(first).unwrap(),
        "group x admins and friends\nuser 1 alice\n-\n"
    );
}

#[test]
fn compact_missing_source_writes_empty_file() {
    let dir = temp_dir();
    let source = dir.path().join("missing.pott");
    let dest = dir.path().join("dest.pott");

    let result = compact(&source, &dest, &StoreConfig::transactional()).unwrap();

    assert_eq!(result, CompactionResult::default());
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "");
}

#[test]
fn compact_overwrites_existing_destination() {
    let dir = temp_dir();
    let source = dir.path().join("source.pott");
    let dest = dir.path().join("dest.pott");
    std::fs::write(&dest, "stale x {}\nstale y {}\n").unwrap();
    save_all(&source, &[Record::new("fresh", "a", "{}")], &StoreConfig::default());

    compact(&source, &dest, &StoreConfig::default()).unwrap();

    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "fresh a {}\n");
}

#[test]
fn compact_refuses_unterminated_source() {
    let dir = temp_dir();
    let source = dir.path().join("source.pott");
    let dest = dir.path().join("dest.pott");
    std::fs::write(&source, "user 1 alice\n").unwrap();

    let err = compact(&source, &dest, &StoreConfig::transactional()).unwrap_err();

    assert!(matches!(
        err,
        CompactError::Read(ReadError::UnterminatedTransaction { .. })
    ));
    assert!(!dest.exists());
}

fn arb_history() -> impl Strategy<Value = Vec<Record>> {
    let key = prop::sample::select(vec!["a", "b", "c", "d"]);
    let namespace = prop::sample::select(vec!["todos", "users"]);
    let payload = proptest::option::of("[a-z ]{1,8}");
    proptest::collection::vec((namespace, key, payload), 0..30).prop_map(|ops| {
        ops.into_iter()
            .map(|(ns, key, payload)| match payload {
                Some(body) => Record::new(ns, key, format!("{{\"v\":\"{}\"}}", body)),
                None => Record::tombstone(ns, key),
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn compaction_preserves_live_state(records in arb_history()) {
        let dir = temp_dir();
        let source = dir.path().join("source.pott");
        let dest = dir.path().join("dest.pott");
        let config = StoreConfig::default().with_sync(false);
        save_all(&source, &records, &config);

        let before = LogReader::new(&source, Dialect::Braced).replay().unwrap();
        compact(&source, &dest, &config).unwrap();
        let after = LogReader::new(&dest, Dialect::Braced).replay().unwrap();

        prop_assert_eq!(&after.state, &before.state);
        prop_assert_eq!(after.line_count, before.state.len() as u64);
    }
}
