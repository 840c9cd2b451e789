//! Verity Core
//!
//! Domain types shared by the comparison engine and the CLI:
//! - Graders and the grader registry
//! - Content sources (candidate/reference text) and input sources (stdin)
//! - Execution specifications, results, and the error taxonomy
//! - Tracing, observability hooks, and metrics

pub mod command;
pub mod diagnostic;
pub mod error;
pub mod grader;
pub mod input;
pub mod metrics;
pub mod obs;
pub mod report;
pub mod source;
pub mod telemetry;

pub use command::{CommandLine, ExecutionSpec};
pub use diagnostic::{Diagnostic, HashMismatch, LineMismatch};
pub use error::{CompareError, Result, VerifyError};
pub use grader::{Grader, GraderFn, GraderRegistry, GraderVerdict, FULL_TEXT, NOIP_STYLE};
pub use input::{FileInput, InputSource, MemoryInput, StdinHandle};
pub use metrics::{Metrics, MetricsSnapshot, METRICS};
pub use obs::{
    compare_span, emit_candidate_finished, emit_compare_finished, emit_compare_started,
    emit_reference_resolved,
};
pub use report::{CandidateState, CompareResult, MismatchReport};
pub use source::{ContentSource, ReadSeek, SharedStream};
pub use telemetry::init_tracing;

/// Verity version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
