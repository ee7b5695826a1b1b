//! Error types
//!
//! Each stage of a run has its own error so the binary can report
//! exactly which file, line or character stopped it. None of these are
//! retried: they all point at data or configuration a human must fix.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Malformed font configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason} at line {line}, column {column}")]
pub struct ParseError {
    pub reason: String,
    /// 1-based line of the offending token
    pub line: usize,
    /// 1-based column (in characters) of the offending token
    pub column: usize,
}

impl ParseError {
    pub fn new(reason: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            reason: reason.into(),
            line,
            column,
        }
    }
}

/// Catalog file missing, unreadable or malformed
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed catalog at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// A character of an eligible msgstr has no glyph in the font
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no glyph defined for {character:?}, used in msgstr '{text}'")]
pub struct MissingGlyphError {
    pub character: char,
    pub text: String,
}

/// External catalog merge failed
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("{program} did not finish within {after:?}")]
    TimedOut { program: String, after: Duration },
    #[error("merge I/O error: {0}")]
    Io(#[from] std::io::Error),
}
