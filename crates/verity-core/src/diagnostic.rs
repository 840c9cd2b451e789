//! Grader diagnostics attached to a negative verdict.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Hash comparison record produced by the `FullText` grader.
///
/// Carries both full texts so reporters can render a diff.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HashMismatch {
    /// Candidate text.
    pub content: String,
    /// Reference text.
    pub std: String,
    /// Hex SHA-256 of the candidate text.
    pub content_hash: String,
    /// Hex SHA-256 of the reference text.
    pub std_hash: String,
}

impl fmt::Display for HashMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hash mismatch: read {}, expected {}",
            self.content_hash, self.std_hash
        )
    }
}

/// First differing line found by a line-oriented grader.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineMismatch {
    /// 1-based line number.
    pub line: usize,
    /// Candidate line, empty when the candidate ran out of lines.
    pub content_line: String,
    /// Reference line, empty when the reference ran out of lines.
    pub std_line: String,
}

impl fmt::Display for LineMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {} differs: read {:?}, expected {:?}",
            self.line, self.content_line, self.std_line
        )
    }
}

/// Grader-specific detail explaining why a candidate was rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum Diagnostic {
    HashMismatch(HashMismatch),
    LineMismatch(LineMismatch),
    /// Free-form explanation.
    Message(String),
    /// Grader-defined JSON payload.
    Structured(serde_json::Value),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::HashMismatch(m) => m.fmt(f),
            Diagnostic::LineMismatch(m) => m.fmt(f),
            Diagnostic::Message(msg) => f.write_str(msg),
            Diagnostic::Structured(value) => write!(f, "{value}"),
        }
    }
}

impl From<HashMismatch> for Diagnostic {
    fn from(value: HashMismatch) -> Self {
        Diagnostic::HashMismatch(value)
    }
}

impl From<LineMismatch> for Diagnostic {
    fn from(value: LineMismatch) -> Self {
        Diagnostic::LineMismatch(value)
    }
}
