//! Error types for reading, generating and converting.

use serde::Serialize;
use std::path::PathBuf;

/// A fragment a reader had to skip.
///
/// Readers never fail as a whole; each skipped fragment is reported as one of
/// these alongside the targets that did parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message} (line {line}, column {column})")]
pub struct ParseError {
    pub message: String,
    /// 1-based.
    pub line: usize,
    /// 1-based, in characters.
    pub column: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

/// A target that violates an IR invariant writers rely on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("target has an empty name")]
    EmptyName,

    #[error("target name {name:?} cannot be written in a build file")]
    InvalidName { name: String },
}

/// Error from the conversion entry points.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("unknown conversion direction: {0:?} (expected gn-to-cmake or cmake-to-gn)")]
    UnknownDirection(String),

    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
