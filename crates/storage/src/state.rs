// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live state folded from log replay

use crate::codec::Record;
use std::collections::BTreeMap;

/// Current value of every live key, derived by folding the log in order
///
/// Later records for the same `(namespace, key)` replace earlier ones and a
/// tombstone removes the key. A namespace without live keys is not kept, so
/// a compacted log replays to an equal state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveState {
    namespaces: BTreeMap<String, BTreeMap<String, String>>,
}

impl LiveState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into the state
    pub fn apply(&mut self, record: Record) {
        let Record {
            namespace,
            key,
            payload,
        } = record;

        if payload.is_empty() {
            if let Some(keys) = self.namespaces.get_mut(&namespace) {
                keys.remove(&key);
                if keys.is_empty() {
                    self.namespaces.remove(&namespace);
                }
            }
        } else {
            self.namespaces
                .entry(namespace)
                .or_default()
                .insert(key, payload);
        }
    }

    /// Payload of a live key
    pub fn get(&self, namespace: &str, key: &str) -> Option<&str> {
        self.namespaces
            .get(namespace)
            .and_then(|keys| keys.get(key))
            .map(String::as_str)
    }

    /// All live keys of one namespace
    pub fn namespace(&self, namespace: &str) -> Option<&BTreeMap<String, String>> {
        self.namespaces.get(namespace)
    }

    /// Names of namespaces holding at least one live key
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    /// Number of live keys across all namespaces
    pub fn len(&self) -> usize {
        self.namespaces.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Iterate `(namespace, key, payload)` in ascending namespace/key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.namespaces.iter().flat_map(|(namespace, keys)| {
            keys.iter()
                .map(move |(key, payload)| (namespace.as_str(), key.as_str(), payload.as_str()))
        })
    }

    /// Live records sorted by namespace, then key
    pub fn into_records(self) -> Vec<Record> {
        self.namespaces
            .into_iter()
            .flat_map(|(namespace, keys)| {
                keys.into_iter()
                    .map(move |(key, payload)| Record::new(namespace.clone(), key, payload))
            })
            .collect()
    }
}

impl FromIterator<Record> for LiveState {
    fn from_iter<I: IntoIterator<Item = Record>>(records: I) -> Self {
        let mut state = Self::new();
        for record in records {
            state.apply(record);
        }
        state
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
