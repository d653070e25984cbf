// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line-driven command loop over a todo store

use crate::todo::{Todo, Todos, NAMESPACE, SAMPLES};
use anyhow::Result;
use pott_storage::{Record, Store, StoreError};
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    List,
    Add,
    Delete,
    Sample,
    Stat,
    Compact,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line; `None` for unknown commands
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "l" | "list" => Some(Command::List),
            "a" | "add" => Some(Command::Add),
            "d" | "del" => Some(Command::Delete),
            "sa" | "sample" => Some(Command::Sample),
            "st" | "stat" => Some(Command::Stat),
            "co" | "compact" => Some(Command::Compact),
            "?" | "help" => Some(Command::Help),
            "q" | "quit" => Some(Command::Quit),
            _ => None,
        }
    }
}

const HELP: &str = "\
Commands:
  l, list     list all todos
  a, add      add todo
  d, del      delete todo
  sa, sample  insert sample todos
  st, stat    show pott stat
  co, compact compact pott file
  ?, help     print help
  q, quit     quit
";

pub struct Shell<R, W> {
    store: Store,
    todos: Todos,
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(store: Store, todos: Todos, input: R, out: W) -> Self {
        Self {
            store,
            todos,
            input,
            out,
        }
    }

    /// Run until `quit` or end of input
    pub fn run(&mut self) -> Result<()> {
        self.help()?;
        loop {
            let Some(line) = self.prompt("> ")? else {
                return Ok(());
            };
            if line.trim().is_empty() {
                continue;
            }
            match Command::parse(&line) {
                Some(Command::List) => self.list()?,
                Some(Command::Add) => self.add()?,
                Some(Command::Delete) => self.delete()?,
                Some(Command::Sample) => self.sample()?,
                Some(Command::Stat) => self.stat()?,
                Some(Command::Compact) => self.compact()?,
                Some(Command::Help) => self.help()?,
                Some(Command::Quit) => {
                    writeln!(self.out, "bye.")?;
                    return Ok(());
                }
                None => writeln!(self.out, "what?")?,
            }
        }
    }

    /// Print `prompt` and read one line without its terminator
    fn prompt(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(len);
        Ok(Some(line))
    }

    fn help(&mut self) -> Result<()> {
        write!(self.out, "{}", HELP)?;
        Ok(())
    }

    fn list(&mut self) -> Result<()> {
        writeln!(self.out, "You have {} todos", self.todos.len())?;
        for todo in self.todos.iter() {
            writeln!(self.out, "  {} - {}", todo.id, todo.text)?;
        }
        Ok(())
    }

    fn add(&mut self) -> Result<()> {
        let Some(id) = self.prompt("Enter Id > ")? else {
            return Ok(());
        };
        let Some(text) = self.prompt("Enter Text > ")? else {
            return Ok(());
        };

        let todo = Todo::new(id, text);
        match self.store.save_value(NAMESPACE, &todo.id, Some(&todo)) {
            Ok(()) => {
                writeln!(self.out, "Added Todo {} - {}", todo.id, todo.text)?;
                self.todos.insert(todo);
                Ok(())
            }
            Err(StoreError::Codec(e)) => {
                writeln!(self.out, "cannot add todo: {}", e)?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&mut self) -> Result<()> {
        let Some(id) = self.prompt("Enter Id > ")? else {
            return Ok(());
        };
        if !self.todos.contains(&id) {
            writeln!(self.out, "Id {} not found", id)?;
            return Ok(());
        }

        self.store.save(NAMESPACE, &id, None)?;
        self.todos.remove(&id);
        writeln!(self.out, "Deleted Todo {}", id)?;
        Ok(())
    }

    fn sample(&mut self) -> Result<()> {
        let todos: Vec<Todo> = SAMPLES
            .iter()
            .enumerate()
            .map(|(i, text)| Todo::new(i.to_string(), *text))
            .collect();
        let records = todos
            .iter()
            .map(|todo| {
                serde_json::to_string(todo).map(|json| Record::new(NAMESPACE, &todo.id, json))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.store.save_batch(&records)?;
        for todo in todos {
            self.todos.insert(todo);
        }
        writeln!(self.out, "Inserted {} sample todos", records.len())?;
        Ok(())
    }

    fn stat(&mut self) -> Result<()> {
        let stat = self.store.stat()?;
        writeln!(self.out, "{:>3} lines total", stat.total_lines)?;
        writeln!(self.out, "{:>3} lines used", stat.used_lines)?;
        Ok(())
    }

    fn compact(&mut self) -> Result<()> {
        let result = self.store.compact()?;
        tracing::debug!(removed = result.lines_removed(), "compacted");
        writeln!(self.out, "compacted")?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;
