// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing errors with context and suggestions.

use pott_storage::{Dialect, ReadError, StoreError};
use std::fmt;
use std::path::Path;

/// Error with context and recovery suggestions for display on stderr.
#[derive(Debug)]
pub struct CliError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
    /// Original error if any
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            source: None,
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Error for a file that could not be replayed with `dialect`.
    pub fn open_failed(path: &Path, dialect: Dialect, err: StoreError) -> Self {
        let shown = path.display();
        let other = match dialect {
            Dialect::Braced => Dialect::Transactional,
            Dialect::Transactional => Dialect::Braced,
        };
        let base = CliError::new(format!("cannot read {}", shown));

        let base = match &err {
            StoreError::Read(ReadError::MalformedLine { line, reason }) => base
                .with_context(format!("line {} is not a valid record: {}", line, reason))
                .with_context("The file may have been written with the other dialect")
                .with_suggestion(format!("Try the other dialect: --dialect {}", other))
                .with_suggestion(format!("Locate every bad line: pott check {}", shown)),
            StoreError::Read(ReadError::UnterminatedTransaction { line, pending }) => base
                .with_context(format!(
                    "{} record(s) from line {} have no closing marker",
                    pending, line
                ))
                .with_context("A writer may have crashed in the middle of a batch")
                .with_suggestion(format!(
                    "If the file has no markers, use --dialect {}",
                    other
                ))
                .with_suggestion(format!("Inspect the tail: pott check {}", shown)),
            _ => base,
        };

        base.with_source(err)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                write!(f, "\n  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            write!(f, "\n\nsuggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                write!(f, "\n  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CliError::new("Something went wrong")
            .with_context("First context")
            .with_context("Second context")
            .with_suggestion("Try this")
            .with_suggestion("Or this");

        let output = format!("{}", err);
        assert!(output.starts_with("Something went wrong\n"));
        assert!(output.contains("-> First context"));
        assert!(output.contains("-> Second context"));
        assert!(output.contains("1. Try this"));
        assert!(output.contains("2. Or this"));
    }

    #[test]
    fn test_malformed_line_suggests_dialect() {
        let err = CliError::open_failed(
            Path::new("data.pott"),
            Dialect::Braced,
            StoreError::Read(ReadError::MalformedLine {
                line: 3,
                reason: "missing payload",
            }),
        );
        let output = format!("{}", err);
        assert!(output.contains("cannot read data.pott"));
        assert!(output.contains("line 3"));
        assert!(output.contains("--dialect transactional"));
        assert!(output.contains("pott check data.pott"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_io_error_has_no_suggestions() {
        let err = CliError::open_failed(
            Path::new("data.pott"),
            Dialect::Braced,
            StoreError::Io(std::io::Error::other("denied")),
        );
        assert!(err.suggestions.is_empty());
    }
}
