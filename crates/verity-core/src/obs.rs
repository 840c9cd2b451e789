//! Structured observability hooks for verification calls.
//!
//! Events carry an `event` field (`compare.started`, `candidate.finished`, …)
//! so JSON log consumers can filter on them.

use tracing::{debug, info, warn};

use crate::report::CandidateState;

/// Span covering one verification call. `mode` is `"output"` or `"program"`.
///
/// Attach with `tracing::Instrument::instrument` rather than entering it, so
/// the instrumented future stays `Send`.
pub fn compare_span(mode: &str, grader: &str) -> tracing::Span {
    tracing::info_span!("verity.compare", mode = %mode, grader = %grader)
}

/// Emit event: verification call started with `candidates` on `pool`.
pub fn emit_compare_started(mode: &str, candidates: usize, pool: &str) {
    info!(
        event = "compare.started",
        mode = %mode,
        candidates = candidates,
        pool = %pool,
    );
}

/// Emit event: reference output resolved, `bytes` long.
pub fn emit_reference_resolved(label: &str, bytes: usize) {
    debug!(event = "reference.resolved", label = %label, bytes = bytes);
}

/// Per-candidate outcome. Passes log at debug, failures at warn.
pub fn emit_candidate_finished(label: &str, state: CandidateState, detail: &dyn std::fmt::Display) {
    if state == CandidateState::Passed {
        debug!(event = "candidate.finished", label = %label, state = %state, "Correct");
    } else {
        warn!(
            event = "candidate.finished",
            label = %label,
            state = %state,
            detail = %detail,
            "!!!INCORRECT!!!"
        );
    }
}

/// Emit event: verification call finished.
pub fn emit_compare_finished(passed: usize, failed: usize, duration_ms: u64) {
    info!(
        event = "compare.finished",
        passed = passed,
        failed = failed,
        duration_ms = duration_ms,
        success = failed == 0,
    );
}
