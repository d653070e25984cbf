// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Todo items and their restore sink

use pott_storage::{Restore, RestoreError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Namespace holding the todo records
pub const NAMESPACE: &str = "todos";

/// Todos inserted by the `sample` command, keyed "0".."3"
pub const SAMPLES: [&str; 4] = [
    "Fix Documentation",
    "Prepare README file",
    "Build Binary",
    "Ship everything to customer",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub text: String,
}

impl Todo {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Todos by id, sorted for listing
#[derive(Debug, Default)]
pub struct Todos {
    items: BTreeMap<String, Todo>,
}

impl Todos {
    pub fn insert(&mut self, todo: Todo) {
        self.items.insert(todo.id.clone(), todo);
    }

    pub fn remove(&mut self, id: &str) -> Option<Todo> {
        self.items.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Todo> {
        self.items.values()
    }
}

impl Restore for Todos {
    /// Records outside [`NAMESPACE`] are ignored.
    fn restore(&mut self, namespace: &str, key: &str, payload: &[u8]) -> Result<(), RestoreError> {
        if namespace != NAMESPACE {
            return Ok(());
        }
        let todo: Todo = serde_json::from_slice(payload)?;
        tracing::debug!(key, id = %todo.id, "restored todo");
        self.insert(todo);
        Ok(())
    }
}

#[cfg(test)]
#[path = "todo_tests.rs"]
mod tests;
