//! Work pools that run candidate tasks.
//!
//! A pool receives one task per candidate and returns one report per task,
//! in submission order, whatever order the tasks finished in. A failing or
//! panicking task never cancels its siblings.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};
use verity_core::{CandidateState, CompareError};

/// A unit of candidate verification.
pub struct CandidateTask {
    pub label: String,
    future: BoxFuture<'static, Result<(), CompareError>>,
}

impl CandidateTask {
    /// Wrap `future` as the task for candidate `label`.
    pub fn new<F>(label: impl Into<String>, future: F) -> Self
    where
        F: Future<Output = Result<(), CompareError>> + Send + 'static,
    {
        Self {
            label: label.into(),
            future: future.boxed(),
        }
    }
}

/// Terminal outcome of one task.
#[derive(Debug)]
pub struct CandidateReport {
    pub label: String,
    /// `Ok` when the candidate passed.
    pub outcome: Result<(), CompareError>,
}

/// Executes candidate tasks.
#[async_trait]
pub trait WorkPool: Send + Sync {
    /// Short description used in logs.
    fn describe(&self) -> String;

    /// Run every task to completion and report each one.
    async fn run(&self, tasks: Vec<CandidateTask>) -> Vec<CandidateReport>;
}

/// Runs tasks one after another on the caller's task, in submission order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialPool;

#[async_trait]
impl WorkPool for SequentialPool {
    fn describe(&self) -> String {
        "sequential".to_string()
    }

    async fn run(&self, tasks: Vec<CandidateTask>) -> Vec<CandidateReport> {
        let mut reports = Vec::with_capacity(tasks.len());
        for task in tasks {
            let CandidateTask { label, future } = task;
            let outcome = run_guarded(&label, future).await;
            reports.push(CandidateReport { label, outcome });
        }
        reports
    }
}

/// Spawns tasks on the tokio runtime with at most `workers` running at once.
#[derive(Debug, Clone, Copy)]
pub struct ParallelPool {
    workers: usize,
}

impl ParallelPool {
    /// Pool running at most `workers` tasks at once (at least one).
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl Default for ParallelPool {
    fn default() -> Self {
        Self::new(default_workers())
    }
}

#[async_trait]
impl WorkPool for ParallelPool {
    fn describe(&self) -> String {
        format!("parallel({})", self.workers)
    }

    async fn run(&self, tasks: Vec<CandidateTask>) -> Vec<CandidateReport> {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let labels: Vec<String> = tasks.iter().map(|t| t.label.clone()).collect();
        let mut outcomes: Vec<Option<Result<(), CompareError>>> =
            labels.iter().map(|_| None).collect();

        let mut set = JoinSet::new();
        for (index, task) in tasks.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let CandidateTask { label, future } = task;
                (index, run_guarded(&label, future).await)
            });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    if let Some(slot) = outcomes.get_mut(index) {
                        *slot = Some(outcome);
                    }
                }
                Err(e) => error!(error = %e, "Candidate task failed to join"),
            }
        }

        labels
            .into_iter()
            .zip(outcomes)
            .map(|(label, outcome)| {
                let outcome = outcome.unwrap_or_else(|| {
                    Err(CompareError::TaskAborted {
                        label: label.clone(),
                        reason: "task did not complete".to_string(),
                    })
                });
                CandidateReport { label, outcome }
            })
            .collect()
    }
}

/// Pool shape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PoolMode {
    /// One task at a time, in submission order.
    Sequential,
    /// Concurrent tasks, bounded by `workers`.
    Parallel { workers: usize },
}

/// Pool configuration; a pool is built from it for each call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PoolConfig {
    pub mode: PoolMode,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::parallel(default_workers())
    }
}

impl PoolConfig {
    pub fn sequential() -> Self {
        Self {
            mode: PoolMode::Sequential,
        }
    }

    pub fn parallel(workers: usize) -> Self {
        Self {
            mode: PoolMode::Parallel { workers },
        }
    }

    /// Build a fresh pool of this shape.
    pub fn build(&self) -> Box<dyn WorkPool> {
        match self.mode {
            PoolMode::Sequential => Box::new(SequentialPool),
            PoolMode::Parallel { workers } => Box::new(ParallelPool::new(workers)),
        }
    }
}

/// Five workers per available CPU: tasks mostly wait on child processes.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        * 5
}

async fn run_guarded(
    label: &str,
    future: BoxFuture<'static, Result<(), CompareError>>,
) -> Result<(), CompareError> {
    debug!(label = %label, state = %CandidateState::Running, "Candidate started");
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(panic) => Err(CompareError::TaskAborted {
            label: label.to_string(),
            reason: panic_message(panic.as_ref()),
        }),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("panicked: {}", msg)
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("panicked: {}", msg)
    } else {
        "panicked".to_string()
    }
}
