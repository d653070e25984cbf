// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn apply_inserts_live_record() {
    let mut state = LiveState::new();
    state.apply(Record::new("todos", "a", "{\"id\":\"a\"}"));

    assert_eq!(state.get("todos", "a"), Some("{\"id\":\"a\"}"));
    assert_eq!(state.len(), 1);
}

#[test]
fn last_write_wins() {
    let state: LiveState = [
        Record::new("ns", "a", "X"),
        Record::new("ns", "a", "Y"),
    ]
    .into_iter()
    .collect();

    assert_eq!(state.get("ns", "a"), Some("Y"));
    assert_eq!(state.len(), 1);
}

#[test]
fn tombstone_removes_key_and_empty_namespace() {
    let mut state = LiveState::new();
    state.apply(Record::new("todos", "a", "{}"));
    state.apply(Record::new("users", "u", "{}"));
    state.apply(Record::tombstone("todos", "a"));

    assert_eq!(state.get("todos", "a"), None);
    assert!(state.namespace("todos").is_none());
    assert_eq!(state.namespaces().collect::<Vec<_>>(), vec!["users"]);
    assert_eq!(state, LiveState::from_iter([Record::new("users", "u", "{}")]));
}

#[test]
fn tombstone_for_unknown_key_is_noop() {
    let mut state = LiveState::new();
    state.apply(Record::tombstone("todos", "ghost"));
    assert!(state.is_empty());
}

#[test]
fn iteration_is_sorted() {
    let state: LiveState = [
        Record::new("b", "2", "x"),
        Record::new("a", "9", "x"),
        Record::new("b", "1", "x"),
        Record::new("a", "10", "x"),
    ]
    .into_iter()
    .collect();

    let keys: Vec<_> = state.iter().map(|(ns, key, _)| format!("{ns}/{key}")).collect();
    assert_eq!(keys, vec!["a/10", "a/9", "b/1", "b/2"]);

    let records = state.into_records();
    assert_eq!(records.first(), Some(&Record::new("a", "10", "x")));
    assert_eq!(records.len(), 4);
}
