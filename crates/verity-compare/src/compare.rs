//! Comparison orchestration: resolve the reference once, fan out candidates,
//! aggregate every outcome.

use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;
use verity_core::{
    compare_span, emit_candidate_finished, emit_compare_finished, emit_compare_started,
    emit_reference_resolved, CandidateState, CompareError, CompareResult, ContentSource,
    Diagnostic, ExecutionSpec, Grader, GraderRegistry, InputSource, MismatchReport, VerifyError,
    METRICS,
};

use crate::exec::execute;
use crate::pool::{CandidateReport, CandidateTask, PoolConfig, WorkPool};

/// Where the reference answer of a `program` call comes from.
enum ReferenceSource {
    File(ContentSource),
    Program(ExecutionSpec),
}

/// Verifies candidates against a reference with a selected grader.
///
/// ```ignore
/// let result = Comparator::new()
///     .grader("NOIPStyle")
///     .pool_config(PoolConfig::parallel(4))
///     .output(Some(ContentSource::path("std.out")), vec![ContentSource::path("a.out")])
///     .await?;
/// ```
#[derive(Clone)]
pub struct Comparator {
    registry: Arc<GraderRegistry>,
    grader: Grader,
    pool: PoolConfig,
    injected_pool: Option<Arc<dyn WorkPool>>,
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Comparator")
            .field("grader", &self.grader)
            .field("pool", &self.pool)
            .field("injected_pool", &self.injected_pool.as_ref().map(|p| p.describe()))
            .finish()
    }
}

impl Comparator {
    /// Shared registry, `FullText` grader, default parallel pool.
    pub fn new() -> Self {
        Self {
            registry: GraderRegistry::shared(),
            grader: Grader::default(),
            pool: PoolConfig::default(),
            injected_pool: None,
        }
    }

    /// Resolve named graders in `registry` instead of the shared one.
    pub fn with_registry(mut self, registry: Arc<GraderRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Select the grader by name or as a direct function.
    pub fn grader(mut self, grader: impl Into<Grader>) -> Self {
        self.grader = grader.into();
        self
    }

    pub fn pool_config(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    /// Use a caller-owned pool instead of building one per call.
    pub fn with_pool(mut self, pool: Arc<dyn WorkPool>) -> Self {
        self.injected_pool = Some(pool);
        self
    }

    pub fn registry(&self) -> &Arc<GraderRegistry> {
        &self.registry
    }

    /// Compare precomputed outputs against `standard`.
    ///
    /// # Errors
    /// - `Configuration` if `standard` is absent
    /// - `Reference` if `standard` cannot be read
    ///
    /// Candidate failures are returned in `CompareResult::failed`.
    pub async fn output(
        &self,
        standard: Option<ContentSource>,
        candidates: Vec<ContentSource>,
    ) -> Result<CompareResult, VerifyError> {
        let standard = standard.ok_or_else(|| {
            VerifyError::Configuration("output() requires a `std` content source".to_string())
        })?;

        let span = compare_span("output", self.grader.display_name());
        async move {
            let start = Instant::now();
            let pool = self.acquire_pool();
            emit_compare_started("output", candidates.len(), &pool.describe());

            let (label, text) = resolve_content(standard)
                .await
                .map_err(|source| VerifyError::Reference { source })?;
            emit_reference_resolved(&label, text.len());
            let reference: Arc<str> = Arc::from(text);

            let tasks = candidates
                .into_iter()
                .map(|source| {
                    let grading = self.grading(&reference);
                    CandidateTask::new(source.label(), async move {
                        let (label, content) = resolve_content(source).await?;
                        grading.grade(&label, &content)
                    })
                })
                .collect();

            let reports = pool.run(tasks).await;
            Ok(aggregate(reports, start))
        }
        .instrument(span)
        .await
    }

    /// Run each candidate program on `input` and compare its stdout with the
    /// reference, which is either a file (`standard`) or the output of a
    /// reference program (`standard_program`) run on the same input.
    ///
    /// # Errors
    /// - `Configuration` if neither or both reference sources are given, or
    ///   a timeout is zero; nothing is executed in that case
    /// - `Reference` if the reference cannot be produced
    pub async fn program(
        &self,
        input: Arc<dyn InputSource>,
        candidates: Vec<ExecutionSpec>,
        standard: Option<ContentSource>,
        standard_program: Option<ExecutionSpec>,
    ) -> Result<CompareResult, VerifyError> {
        let reference_source = match (standard, standard_program) {
            (Some(_), Some(_)) => {
                return Err(VerifyError::Configuration(
                    "program() accepts only one of `std` and `std_program`".to_string(),
                ))
            }
            (None, None) => {
                return Err(VerifyError::Configuration(
                    "program() missing required reference: `std` or `std_program`".to_string(),
                ))
            }
            (Some(file), None) => ReferenceSource::File(file),
            (None, Some(spec)) => ReferenceSource::Program(spec),
        };

        if let ReferenceSource::Program(spec) = &reference_source {
            validate_timeout(spec)?;
        }
        for spec in &candidates {
            validate_timeout(spec)?;
        }

        let span = compare_span("program", self.grader.display_name());
        async move {
            let start = Instant::now();
            let pool = self.acquire_pool();
            emit_compare_started("program", candidates.len(), &pool.describe());

            let (label, text) = match reference_source {
                ReferenceSource::File(file) => resolve_content(file).await,
                ReferenceSource::Program(spec) => execute(&spec, input.as_ref())
                    .await
                    .map(|text| (spec.label(), text)),
            }
            .map_err(|source| VerifyError::Reference { source })?;
            emit_reference_resolved(&label, text.len());
            let reference: Arc<str> = Arc::from(text);

            let tasks = candidates
                .into_iter()
                .map(|spec| {
                    let grading = self.grading(&reference);
                    let input = Arc::clone(&input);
                    let label = spec.label();
                    CandidateTask::new(label.clone(), async move {
                        let content = execute(&spec, input.as_ref()).await?;
                        grading.grade(&label, &content)
                    })
                })
                .collect();

            let reports = pool.run(tasks).await;
            Ok(aggregate(reports, start))
        }
        .instrument(span)
        .await
    }

    fn acquire_pool(&self) -> Arc<dyn WorkPool> {
        match &self.injected_pool {
            Some(pool) => Arc::clone(pool),
            None => Arc::from(self.pool.build()),
        }
    }

    fn grading(&self, reference: &Arc<str>) -> Grading {
        Grading {
            registry: Arc::clone(&self.registry),
            grader: self.grader.clone(),
            reference: Arc::clone(reference),
        }
    }
}

/// Everything a candidate task needs to grade its content.
struct Grading {
    registry: Arc<GraderRegistry>,
    grader: Grader,
    reference: Arc<str>,
}

impl Grading {
    fn grade(&self, label: &str, content: &str) -> Result<(), CompareError> {
        let verdict = self.registry.invoke(&self.grader, content, &self.reference)?;
        METRICS.inc_grader_calls();
        if verdict.passed {
            return Ok(());
        }
        Err(CompareError::Mismatch {
            label: label.to_string(),
            diagnostic: verdict.diagnostic.unwrap_or_else(|| {
                Diagnostic::Message(format!("rejected by grader {}", self.grader.display_name()))
            }),
        })
    }
}

fn validate_timeout(spec: &ExecutionSpec) -> Result<(), VerifyError> {
    match spec.timeout {
        Some(limit) if limit.is_zero() => Err(VerifyError::Configuration(format!(
            "timeout for `{}` must be positive",
            spec.label()
        ))),
        _ => Ok(()),
    }
}

/// Resolve a content source on a blocking thread.
async fn resolve_content(source: ContentSource) -> Result<(String, String), CompareError> {
    let label = source.label();
    tokio::task::spawn_blocking(move || source.resolve())
        .await
        .map_err(|e| CompareError::TaskAborted {
            label,
            reason: e.to_string(),
        })?
}

fn aggregate(reports: Vec<CandidateReport>, start: Instant) -> CompareResult {
    let mut result = CompareResult::default();
    for report in reports {
        match report.outcome {
            Ok(()) => {
                METRICS.record_outcome(CandidateState::Passed);
                emit_candidate_finished(&report.label, CandidateState::Passed, &"");
                result.passed.push(report.label);
            }
            Err(error) => {
                let state = CandidateState::from(&error);
                METRICS.record_outcome(state);
                emit_candidate_finished(&report.label, state, &error);
                result.failed.push(MismatchReport::new(report.label, error));
            }
        }
    }
    result.duration_ms = start.elapsed().as_millis() as u64;
    emit_compare_finished(result.passed.len(), result.failed.len(), result.duration_ms);
    result
}
