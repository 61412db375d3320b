//! Session error types

use std::fmt;
use thiserror::Error;

/// Malformed input data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Session name cannot be empty")]
    EmptyName,

    #[error("Session name is too long ({len} characters, maximum {max})")]
    NameTooLong { len: usize, max: usize },

    #[error("Session name contains an invalid character: {0:?}")]
    UnsafeName(char),

    #[error("A session needs at least one tab")]
    NoTabs,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// One rejected session in a batch write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub index: usize,
    pub name: String,
    pub error: ValidationError,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session #{} ({:?}): {}", self.index, self.name, self.error)
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid sessions: {}", join_violations(.0))]
    InvalidBatch(Vec<Violation>),

    #[error("Session not found at index {0}")]
    NotFound(usize),

    #[error("Session {0:?} has no tabs")]
    EmptySession(String),

    #[error("Nothing to restore")]
    NothingToRestore,

    #[error("Corrupt import file: {0}")]
    CorruptImport(String),

    #[error("Storage error: {0}")]
    Storage(#[from] tabstash_storage::StorageError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
