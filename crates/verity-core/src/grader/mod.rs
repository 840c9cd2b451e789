//! Graders: pluggable equivalence checks between candidate and reference text.
//!
//! # Modules
//!
//! - [`registry`]: `GraderRegistry` (name → function, process-wide default)
//! - [`fulltext`]: `FullText`: SHA-256 equality on exact bytes
//! - [`noip`]: `NOIPStyle`: line-wise, trailing whitespace ignored

pub mod fulltext;
pub mod noip;
pub mod registry;

use std::fmt;
use std::sync::Arc;

use crate::diagnostic::Diagnostic;

pub use fulltext::{fulltext, FULL_TEXT};
pub use noip::{noip_style, NOIP_STYLE};
pub use registry::GraderRegistry;

/// Outcome of one grading call.
#[derive(Debug, Clone, PartialEq)]
pub struct GraderVerdict {
    /// Whether the candidate is accepted.
    pub passed: bool,
    /// Why the candidate was rejected.
    pub diagnostic: Option<Diagnostic>,
}

impl GraderVerdict {
    pub fn pass() -> Self {
        Self {
            passed: true,
            diagnostic: None,
        }
    }

    pub fn fail(diagnostic: impl Into<Diagnostic>) -> Self {
        Self {
            passed: false,
            diagnostic: Some(diagnostic.into()),
        }
    }
}

/// Grading function: `(content, std) -> verdict`.
pub type GraderFn = Arc<dyn Fn(&str, &str) -> GraderVerdict + Send + Sync>;

/// Grader selection: a registered name or a function used directly.
#[derive(Clone)]
pub enum Grader {
    /// Looked up in the registry at grading time.
    Named(String),
    /// Called as is, bypassing the registry.
    Direct(GraderFn),
}

impl Grader {
    pub fn named(name: impl Into<String>) -> Self {
        Grader::Named(name.into())
    }

    pub fn direct<F>(func: F) -> Self
    where
        F: Fn(&str, &str) -> GraderVerdict + Send + Sync + 'static,
    {
        Grader::Direct(Arc::new(func))
    }

    /// Name used in logs.
    pub fn display_name(&self) -> &str {
        match self {
            Grader::Named(name) => name,
            Grader::Direct(_) => "<direct>",
        }
    }
}

impl Default for Grader {
    fn default() -> Self {
        Grader::Named(FULL_TEXT.to_string())
    }
}

impl fmt::Debug for Grader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grader::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Grader::Direct(_) => f.write_str("Direct(..)"),
        }
    }
}

impl From<&str> for Grader {
    fn from(value: &str) -> Self {
        Grader::Named(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grader_is_fulltext() {
        match Grader::default() {
            Grader::Named(name) => assert_eq!(name, "FullText"),
            Grader::Direct(_) => panic!("expected named grader"),
        }
    }

    #[test]
    fn test_direct_grader_debug_and_name() {
        let grader = Grader::direct(|_, _| GraderVerdict::pass());
        assert_eq!(format!("{grader:?}"), "Direct(..)");
        assert_eq!(grader.display_name(), "<direct>");
    }

    #[test]
    fn test_verdict_constructors() {
        assert!(GraderVerdict::pass().passed);
        let v = GraderVerdict::fail(Diagnostic::Message("no".to_string()));
        assert!(!v.passed);
        assert!(v.diagnostic.is_some());
    }
}
