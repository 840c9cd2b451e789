//! Error taxonomy for Verity.
//!
//! Two layers:
//! - [`VerifyError`] aborts a whole `output`/`program` call.
//! - [`CompareError`] belongs to a single candidate and is collected into
//!   the final result without affecting sibling candidates.

use std::time::Duration;

use crate::diagnostic::Diagnostic;

/// Failure of a single candidate (or of the reference while it is resolved).
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error("unknown grader: {name}")]
    UnknownGrader { name: String },

    #[error("In program: `{label}`: {diagnostic}")]
    Mismatch { label: String, diagnostic: Diagnostic },

    #[error("`{command}` timed out after {:.3}s", .timeout.as_secs_f64())]
    ExecutionTimeout { command: String, timeout: Duration },

    #[error("`{command}` failed: {cause}")]
    Execution { command: String, cause: String },

    #[error("failed to read {label}: {source}")]
    Source {
        label: String,
        #[source]
        source: std::io::Error,
    },

    #[error("task for {label} aborted: {reason}")]
    TaskAborted { label: String, reason: String },
}

impl CompareError {
    /// Grader diagnostic, present only for content mismatches.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            CompareError::Mismatch { diagnostic, .. } => Some(diagnostic),
            _ => None,
        }
    }

    /// Whether this failure came from running a process rather than from content.
    pub fn is_execution_failure(&self) -> bool {
        !matches!(self, CompareError::Mismatch { .. })
    }
}

/// Errors that abort a verification call as a whole.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("failed to resolve reference output: {source}")]
    Reference {
        #[source]
        source: CompareError,
    },
}

/// Result type for call-level operations.
pub type Result<T> = std::result::Result<T, VerifyError>;
