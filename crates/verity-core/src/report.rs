//! Verification results.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::diagnostic::Diagnostic;
use crate::error::CompareError;

/// Lifecycle of one candidate task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CandidateState {
    /// Submitted, not yet started.
    Pending,
    Running,
    Passed,
    /// Output rejected by the grader.
    Mismatched,
    TimedOut,
    /// No gradable output; see the error for the cause.
    ExecutionFailed,
}

impl CandidateState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CandidateState::Pending | CandidateState::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateState::Pending => "pending",
            CandidateState::Running => "running",
            CandidateState::Passed => "passed",
            CandidateState::Mismatched => "mismatched",
            CandidateState::TimedOut => "timed_out",
            CandidateState::ExecutionFailed => "execution_failed",
        }
    }
}

impl fmt::Display for CandidateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&CompareError> for CandidateState {
    fn from(err: &CompareError) -> Self {
        match err {
            CompareError::Mismatch { .. } => CandidateState::Mismatched,
            CompareError::ExecutionTimeout { .. } => CandidateState::TimedOut,
            _ => CandidateState::ExecutionFailed,
        }
    }
}

/// One failed candidate.
#[derive(Debug)]
pub struct MismatchReport {
    pub label: String,
    pub error: CompareError,
}

impl MismatchReport {
    pub fn new(label: impl Into<String>, error: CompareError) -> Self {
        Self {
            label: label.into(),
            error,
        }
    }

    pub fn state(&self) -> CandidateState {
        CandidateState::from(&self.error)
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        self.error.diagnostic()
    }
}

impl fmt::Display for MismatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.label, self.state(), self.error)
    }
}

impl Serialize for MismatchReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("MismatchReport", 4)?;
        s.serialize_field("label", &self.label)?;
        s.serialize_field("state", &self.state())?;
        s.serialize_field("message", &self.error.to_string())?;
        s.serialize_field("diagnostic", &self.diagnostic())?;
        s.end()
    }
}

/// Outcome of an `output` or `program` call.
#[derive(Debug, Default, Serialize)]
pub struct CompareResult {
    /// Labels of candidates that passed, in submission order.
    pub passed: Vec<String>,

    /// Failed candidates, in submission order.
    pub failed: Vec<MismatchReport>,

    /// Wall-clock duration of the call in milliseconds.
    pub duration_ms: u64,
}

impl CompareResult {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn passed_count(&self) -> usize {
        self.passed.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn total(&self) -> usize {
        self.passed.len() + self.failed.len()
    }

    /// Failure entry for `label`, if that candidate failed.
    pub fn failure(&self, label: &str) -> Option<&MismatchReport> {
        self.failed.iter().find(|r| r.label == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_state_from_error() {
        let timeout = CompareError::ExecutionTimeout {
            command: "x".to_string(),
            timeout: Duration::from_secs(1),
        };
        assert_eq!(CandidateState::from(&timeout), CandidateState::TimedOut);

        let unknown = CompareError::UnknownGrader {
            name: "Nope".to_string(),
        };
        assert_eq!(
            CandidateState::from(&unknown),
            CandidateState::ExecutionFailed
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(!CandidateState::Pending.is_terminal());
        assert!(!CandidateState::Running.is_terminal());
        assert!(CandidateState::Passed.is_terminal());
        assert!(CandidateState::TimedOut.is_terminal());
    }

    #[test]
    fn test_result_counts() {
        let result = CompareResult {
            passed: vec!["a".to_string()],
            failed: vec![MismatchReport::new(
                "b",
                CompareError::Mismatch {
                    label: "b".to_string(),
                    diagnostic: Diagnostic::Message("differs".to_string()),
                },
            )],
            duration_ms: 3,
        };
        assert!(!result.is_success());
        assert_eq!(result.total(), 2);
        assert_eq!(result.failed_count(), 1);
        assert!(result.failure("b").is_some());
        assert!(result.failure("a").is_none());
    }

    #[test]
    fn test_report_serializes_state_and_diagnostic() {
        let report = MismatchReport::new(
            "sol",
            CompareError::Execution {
                command: "sol".to_string(),
                cause: "exit status: 3".to_string(),
            },
        );
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["label"], "sol");
        assert_eq!(json["state"], "execution_failed");
        assert!(json["diagnostic"].is_null());
        assert!(json["message"].as_str().unwrap_or("").contains("exit status: 3"));
    }
}
