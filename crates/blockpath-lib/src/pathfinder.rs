//! Asynchronous pathfinding entry point.
//!
//! [`Pathfinder`] validates requests, schedules each search as one unit of
//! work on a bounded worker pool, and hands the caller a [`PathTask`]: a
//! future that resolves exactly once with a [`PathResult`] and supports
//! cooperative cancellation.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};

use crate::error::Error;
use crate::geometry::Position;
use crate::movement::{MovementRule, StandardMovement};
use crate::result::{FailureReason, PathResult};
use crate::search::{run_search, SearchLimits, SearchRequest};
use crate::snapshot::SnapshotProvider;

/// Tuning knobs for a [`Pathfinder`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathfinderConfig {
    /// Maximum node expansions per search.
    pub max_iterations: u64,
    /// Wall-clock budget per search, measured from the moment the search
    /// starts running (queueing for a worker slot does not count).
    pub timeout: Option<Duration>,
    /// Resolve exhausted budgets with a best-effort partial path instead of
    /// a timeout failure.
    pub allow_partial: bool,
    /// Upper bound on simultaneously running searches; protects the
    /// snapshot provider from unbounded concurrent load.
    pub max_concurrent_searches: usize,
}

impl Default for PathfinderConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            timeout: None,
            allow_partial: false,
            max_concurrent_searches: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }
}

impl PathfinderConfig {
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_partial_results(mut self, allow_partial: bool) -> Self {
        self.allow_partial = allow_partial;
        self
    }

    pub fn with_max_concurrent_searches(mut self, limit: usize) -> Self {
        self.max_concurrent_searches = limit;
        self
    }
}

/// Asynchronous pathfinder over a [`SnapshotProvider`].
///
/// The pathfinder owns no world state; every search reads blocks through
/// the provider and legality through the movement rule, both shared across
/// searches. `find_path` must be called from within a Tokio runtime.
pub struct Pathfinder {
    provider: Arc<dyn SnapshotProvider>,
    rule: Arc<dyn MovementRule>,
    config: PathfinderConfig,
    limiter: Arc<Semaphore>,
}

impl Pathfinder {
    /// Pathfinder with the default configuration and movement rule.
    pub fn new(provider: Arc<dyn SnapshotProvider>) -> Self {
        Self::with_config(provider, PathfinderConfig::default())
    }

    pub fn with_config(provider: Arc<dyn SnapshotProvider>, config: PathfinderConfig) -> Self {
        let limiter = Arc::new(Semaphore::new(config.max_concurrent_searches.max(1)));
        Self {
            provider,
            rule: Arc::new(StandardMovement::default()),
            config,
            limiter,
        }
    }

    /// Replace the movement rule consulted during expansion.
    pub fn with_movement_rule(mut self, rule: Arc<dyn MovementRule>) -> Self {
        self.rule = rule;
        self
    }

    pub fn config(&self) -> &PathfinderConfig {
        &self.config
    }

    /// Schedule a search from `start` to `target`.
    ///
    /// Invalid input (mismatched domains, non-finite coordinates) is
    /// rejected synchronously: the returned task resolves immediately with
    /// an invalid-input failure and the provider is never queried.
    pub fn find_path(&self, start: Position, target: Position) -> PathTask {
        if let Err(error) = validate_request(&start, &target) {
            tracing::warn!(%error, "rejecting pathfinding request");
            return PathTask::ready(PathResult::failure(FailureReason::InvalidInput));
        }

        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let provider = Arc::clone(&self.provider);
        let rule = Arc::clone(&self.rule);
        let limiter = Arc::clone(&self.limiter);
        let limits = SearchLimits {
            max_iterations: self.config.max_iterations,
            timeout: self.config.timeout,
            allow_partial: self.config.allow_partial,
        };

        let handle = tokio::spawn(async move {
            let _permit = match limiter.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    // The semaphore is never closed while the pathfinder is
                    // alive; treat it as an internal fault if it happens.
                    return PathResult::failure(FailureReason::Internal);
                }
            };
            if flag.load(Ordering::Relaxed) {
                return PathResult::failure(FailureReason::Cancelled);
            }

            let joined = tokio::task::spawn_blocking(move || {
                run_search(SearchRequest {
                    provider: provider.as_ref(),
                    rule: rule.as_ref(),
                    start,
                    target,
                    limits,
                    cancel: flag.as_ref(),
                })
            })
            .await;

            match joined {
                Ok(result) => result,
                Err(join_error) => fault_result(join_error),
            }
        });

        PathTask {
            cancel,
            state: TaskState::Running(handle),
        }
    }
}

fn validate_request(start: &Position, target: &Position) -> Result<(), Error> {
    if start.domain() != target.domain() {
        return Err(Error::DomainMismatch {
            start: start.domain(),
            target: target.domain(),
        });
    }
    for (which, position) in [("start", start), ("target", target)] {
        for (axis, value) in [('x', position.x()), ('y', position.y()), ('z', position.z())] {
            if !value.is_finite() {
                return Err(Error::NonFiniteCoordinate { which, axis, value });
            }
        }
    }
    Ok(())
}

fn fault_result(join_error: JoinError) -> PathResult {
    if join_error.is_panic() {
        let error = Error::WorkerPanic {
            detail: panic_detail(join_error),
        };
        tracing::error!(%error, "search worker failed");
        PathResult::failure(FailureReason::Internal)
    } else {
        PathResult::failure(FailureReason::Cancelled)
    }
}

fn panic_detail(join_error: JoinError) -> String {
    let payload = join_error.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

enum TaskState {
    Ready(Option<PathResult>),
    Running(JoinHandle<PathResult>),
}

/// Handle to one scheduled search.
///
/// Resolves exactly once with the search's [`PathResult`]; continuations
/// attach by awaiting it. Dropping the task detaches the search without
/// cancelling it. [`PathTask::cancel`] requests cooperative cancellation,
/// honoured at node-expansion granularity, after which the task resolves
/// with a cancelled failure.
#[must_use = "a path task does nothing unless awaited"]
#[derive(Debug)]
pub struct PathTask {
    cancel: Arc<AtomicBool>,
    state: TaskState,
}

impl PathTask {
    fn ready(result: PathResult) -> Self {
        Self {
            cancel: Arc::new(AtomicBool::new(false)),
            state: TaskState::Ready(Some(result)),
        }
    }

    /// Request cancellation. Latency is bounded by one expansion step.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskState::Ready(_) => f.write_str("Ready"),
            TaskState::Running(_) => f.write_str("Running"),
        }
    }
}

impl Future for PathTask {
    type Output = PathResult;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<PathResult> {
        let this = self.get_mut();
        match &mut this.state {
            TaskState::Ready(slot) => {
                Poll::Ready(slot.take().expect("path task polled after completion"))
            }
            TaskState::Running(handle) => match Pin::new(handle).poll(cx) {
                Poll::Ready(Ok(result)) => Poll::Ready(result),
                Poll::Ready(Err(join_error)) => Poll::Ready(fault_result(join_error)),
                Poll::Pending => Poll::Pending,
            },
        }
    }
}
