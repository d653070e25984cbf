// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end behaviour of the store through its public API

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use pott_storage::{
    Dialect, LiveState, LogReader, ReadError, Record, RestoreError, Stat, Store, StoreConfig,
    StoreError,
};
use similar_asserts::assert_eq;
use std::path::PathBuf;
use tempfile::TempDir;

fn temp_store_path() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("todos.pott");
    (dir, path)
}

#[test]
fn four_saves_then_reopen() {
    let (_dir, path) = temp_store_path();
    {
        let store = Store::open(&path, StoreConfig::default()).unwrap();
        store.save("todos", "a", Some(r#"{"id":"a","name":"Alice"}"#)).unwrap();
        store.save("todos", "b", Some(r#"{"id":"b","name":"Bob"}"#)).unwrap();
        store.save("todos", "a", Some(r#"{"id":"a","name":"Alice2"}"#)).unwrap();
        store.save("todos", "b", None).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 4);
        assert_eq!(
            store.stat().unwrap(),
            Stat {
                total_lines: 4,
                used_lines: 1
            }
        );
    }

    let mut restored = Vec::new();
    let mut sink = |namespace: &str, key: &str, payload: &[u8]| -> Result<(), RestoreError> {
        restored.push((
            namespace.to_string(),
            key.to_string(),
            String::from_utf8(payload.to_vec())?,
        ));
        Ok(())
    };
    Store::open_with(&path, StoreConfig::default(), &mut sink).unwrap();

    assert_eq!(
        restored,
        vec![(
            "todos".to_string(),
            "a".to_string(),
            r#"{"id":"a","name":"Alice2"}"#.to_string()
        )]
    );
}

#[test]
fn nonexistent_path_opens_empty() {
    let (_dir, path) = temp_store_path();

    let mut calls = 0;
    let mut sink = |_: &str, _: &str, _: &[u8]| -> Result<(), RestoreError> {
        calls += 1;
        Ok(())
    };
    let store = Store::open_with(&path, StoreConfig::default(), &mut sink).unwrap();

    assert_eq!(calls, 0);
    assert_eq!(store.stat().unwrap(), Stat::default());
    assert!(!path.exists());
}

#[test]
fn unterminated_transaction_fails_open() {
    let (_dir, path) = temp_store_path();
    std::fs::write(&path, "user 1 alice\n-\nuser 2 bob\n").unwrap();

    let err = Store::open(&path, StoreConfig::transactional()).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Read(ReadError::UnterminatedTransaction { .. })
    ));
}

#[test]
fn last_write_wins_and_tombstones_delete() {
    let (_dir, path) = temp_store_path();
    let store = Store::open(&path, StoreConfig::transactional()).unwrap();
    store.save("ns", "a", Some("X")).unwrap();
    store.save("ns", "a", Some("Y")).unwrap();
    store.save("ns", "gone", Some("Z")).unwrap();
    store.save("ns", "gone", None).unwrap();

    let mut state = LiveState::new();
    Store::open_with(&path, StoreConfig::transactional(), &mut state).unwrap();

    assert_eq!(state.get("ns", "a"), Some("Y"));
    assert_eq!(state.get("ns", "gone"), None);
    assert_eq!(store.stat().unwrap().used_lines, 1);
}

#[test]
fn compaction_fidelity_and_idempotence() {
    let (_dir, path) = temp_store_path();
    let store = Store::open(&path, StoreConfig::default()).unwrap();
    for i in 0..10 {
        store
            .save("counters", "hits", Some(format!("{{\"n\":{i}}}").as_str()))
            .unwrap();
        store
            .save("counters", &format!("k{}", i % 3), Some("{}"))
            .unwrap();
    }
    store.save("counters", "k1", None).unwrap();

    let before = LogReader::new(&path, Dialect::Braced).replay().unwrap();
    let stat_before = store.stat().unwrap();

    store.compact().unwrap();
    let once = std::fs::read(&path).unwrap();
    store.compact().unwrap();
    let twice = std::fs::read(&path).unwrap();

    let after = LogReader::new(&path, Dialect::Braced).replay().unwrap();
    assert_eq!(after.state, before.state);
    assert_eq!(store.stat().unwrap().total_lines, stat_before.used_lines);
    assert_eq!(once, twice);
}

#[test]
fn dialects_are_not_interchangeable() {
    let (_dir, path) = temp_store_path();
    let store = Store::open(&path, StoreConfig::transactional()).unwrap();
    store
        .save_batch(&[Record::new("user", "1", "alice"), Record::new("user", "2", "bob")])
        .unwrap();

    let err = Store::open(&path, StoreConfig::default()).unwrap_err();
    assert!(matches!(err, StoreError::Read(ReadError::MalformedLine { .. })));
}

#[test]
fn torn_append_survives_reopen_until_compacted() {
    let (_dir, path) = temp_store_path();
    {
        let store = Store::open(&path, StoreConfig::default()).unwrap();
        store.save("todos", "a", Some(r#"{"id":"a"}"#)).unwrap();
    }
    // A crashed writer left half a line behind
    let mut torn = std::fs::read_to_string(&path).unwrap();
    torn.push_str(r#"todos b {"id":"b","na"#);
    std::fs::write(&path, &torn).unwrap();

    let store = Store::open(&path, StoreConfig::default()).unwrap();
    let err = store.save("todos", "c", Some(r#"{"id":"c"}"#)).unwrap_err();
    assert!(matches!(err, StoreError::Poisoned { .. }));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), torn);
    assert!(!LogReader::new(&path, Dialect::Braced)
        .validate()
        .unwrap()
        .is_clean());

    store.compact().unwrap();
    store.save("todos", "c", Some(r#"{"id":"c"}"#)).unwrap();
    let validation = LogReader::new(&path, Dialect::Braced).validate().unwrap();
    assert!(validation.is_clean());
    assert_eq!(validation.record_lines, 3);
}
