//! Error types for each conversion stage

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading and normalizing the input table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("input file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("input table is empty ({rows} rows, {columns} columns)")]
    EmptyInput { rows: usize, columns: usize },

    #[error("line {line}: expected at least {expected} columns, found {found}")]
    TooFewColumns {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("line {line}, column {column}: id '{value}' is not an integer")]
    InvalidId {
        line: u64,
        column: usize,
        value: String,
    },

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while rebuilding the tree from table rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("line {line}: level 1 label '{found}' does not match root label '{expected}'")]
    HierarchyMismatch {
        line: u64,
        expected: String,
        found: String,
    },

    #[error("line {line}: no node labelled '{label}' to attach level {level} to")]
    MalformedHierarchy {
        line: u64,
        level: usize,
        label: String,
    },

    #[error("line {line}: level {level} is blank but deeper levels are populated")]
    BlankLevel { line: u64, level: usize },
}

/// Errors raised while rendering or persisting the tree.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write {}: {reason}", .path.display())]
    WriteFailure {
        path: PathBuf,
        reason: WriteFailureReason,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize tree: {0}")]
    Serialize(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFailureReason {
    PermissionDenied,
    Other,
}

impl std::fmt::Display for WriteFailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteFailureReason::PermissionDenied => write!(f, "inadequate permissions"),
            WriteFailureReason::Other => write!(f, "I/O error"),
        }
    }
}

impl WriteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let reason = match source.kind() {
            std::io::ErrorKind::PermissionDenied => WriteFailureReason::PermissionDenied,
            _ => WriteFailureReason::Other,
        };
        WriteError::WriteFailure {
            path: path.into(),
            reason,
            source,
        }
    }
}

/// Any failure of the end-to-end conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Write(#[from] WriteError),
}
