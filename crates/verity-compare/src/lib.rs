//! Verity Compare - program execution and output verification
//!
//! Provides the comparison engine that:
//! - Runs candidate and reference programs with per-program timeouts
//! - Resolves the reference answer exactly once per call
//! - Fans candidates out over a sequential or parallel work pool
//! - Collects every per-candidate failure into a single result

pub mod compare;
pub mod exec;
pub mod pool;

// Re-export key types
pub use compare::Comparator;
pub use exec::execute;
pub use pool::{
    default_workers, CandidateReport, CandidateTask, ParallelPool, PoolConfig, PoolMode,
    SequentialPool, WorkPool,
};
pub use verity_core::{
    CandidateState, CommandLine, CompareError, CompareResult, ContentSource, Diagnostic,
    ExecutionSpec, FileInput, Grader, GraderRegistry, GraderVerdict, InputSource, MemoryInput,
    MismatchReport, VerifyError,
};
