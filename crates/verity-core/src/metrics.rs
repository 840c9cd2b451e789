//! Process-wide verification counters.
//!
//! Candidate outcomes are tallied per terminal [`CandidateState`]; process
//! launches, timeouts, and grader calls are counted where they happen.
//! [`Metrics::snapshot`] reads everything at once and [`Metrics::flush`]
//! logs that snapshot as one `info!` event.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::report::CandidateState;

/// Shared counters for the whole process.
pub static METRICS: Metrics = Metrics::new();

/// Terminal states, in slot order.
const OUTCOMES: [CandidateState; 4] = [
    CandidateState::Passed,
    CandidateState::Mismatched,
    CandidateState::TimedOut,
    CandidateState::ExecutionFailed,
];

/// Lock-free counters behind [`METRICS`].
pub struct Metrics {
    outcomes: [AtomicU64; 4],
    grader_calls: AtomicU64,
    processes_spawned: AtomicU64,
    timeouts: AtomicU64,
}

/// Point-in-time copy of every counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub passed: u64,
    pub mismatched: u64,
    pub timed_out: u64,
    pub execution_failed: u64,
    pub grader_calls: u64,
    pub processes_spawned: u64,
    pub timeouts: u64,
}

impl MetricsSnapshot {
    /// Candidates that reached a terminal state.
    pub fn candidates(&self) -> u64 {
        self.passed + self.mismatched + self.timed_out + self.execution_failed
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            outcomes: [
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
            ],
            grader_calls: AtomicU64::new(0),
            processes_spawned: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
        }
    }

    /// Count one finished candidate. `Pending` and `Running` are ignored.
    pub fn record_outcome(&self, state: CandidateState) {
        if let Some(slot) = outcome_slot(state) {
            self.outcomes[slot].fetch_add(1, Ordering::Relaxed);
            tracing::trace!(metric = "outcome", state = %state, "counter incremented");
        }
    }

    /// Finished candidates in `state`; zero for non-terminal states.
    pub fn outcome(&self, state: CandidateState) -> u64 {
        outcome_slot(state)
            .map(|slot| self.outcomes[slot].load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn inc_grader_calls(&self) {
        self.grader_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// One child process launched.
    pub fn inc_processes_spawned(&self) {
        self.processes_spawned.fetch_add(1, Ordering::Relaxed);
    }

    /// One process killed for exceeding its time limit.
    pub fn inc_timeouts(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            passed: self.outcome(CandidateState::Passed),
            mismatched: self.outcome(CandidateState::Mismatched),
            timed_out: self.outcome(CandidateState::TimedOut),
            execution_failed: self.outcome(CandidateState::ExecutionFailed),
            grader_calls: self.grader_calls.load(Ordering::Relaxed),
            processes_spawned: self.processes_spawned.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
        }
    }

    /// Log the current snapshot.
    pub fn flush(&self) {
        let s = self.snapshot();
        tracing::info!(
            metric = "flush",
            candidates = s.candidates(),
            passed = s.passed,
            mismatched = s.mismatched,
            timed_out = s.timed_out,
            execution_failed = s.execution_failed,
            grader_calls = s.grader_calls,
            processes_spawned = s.processes_spawned,
            timeouts = s.timeouts,
        );
    }

    /// Zero every counter.
    pub fn reset(&self) {
        for counter in &self.outcomes {
            counter.store(0, Ordering::Relaxed);
        }
        self.grader_calls.store(0, Ordering::Relaxed);
        self.processes_spawned.store(0, Ordering::Relaxed);
        self.timeouts.store(0, Ordering::Relaxed);
    }
}

fn outcome_slot(state: CandidateState) -> Option<usize> {
    OUTCOMES.iter().position(|s| *s == state)
}
