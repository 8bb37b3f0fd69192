//! Structured pathfinding results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Position;

/// Overall outcome of a pathfinding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathOutcome {
    /// A complete path from the start block to the target block.
    Success,
    /// A best-effort path towards the target, produced when a budget ran
    /// out and partial results were requested.
    Partial,
    /// No path; see the failure reason.
    Failed,
}

impl fmt::Display for PathOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            PathOutcome::Success => "success",
            PathOutcome::Partial => "partial",
            PathOutcome::Failed => "failed",
        };
        f.write_str(value)
    }
}

/// Why a request did not produce a complete path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The frontier emptied without reaching the target.
    NoPath,
    /// The iteration or wall-clock budget ran out.
    Timeout,
    /// The request was rejected before any search started.
    InvalidInput,
    /// The caller cancelled the search.
    Cancelled,
    /// The search worker failed unexpectedly; details are in the log.
    Internal,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            FailureReason::NoPath => "no_path",
            FailureReason::Timeout => "timeout",
            FailureReason::InvalidInput => "invalid_input",
            FailureReason::Cancelled => "cancelled",
            FailureReason::Internal => "internal",
        };
        f.write_str(value)
    }
}

/// Result delivered to the caller, exactly once per request.
///
/// `path` is ordered from the start block to the last reached block and is
/// empty unless the outcome is [`PathOutcome::Success`] or
/// [`PathOutcome::Partial`]. `cost` is the accumulated step cost of `path`.
#[derive(Debug, Clone, Serialize)]
pub struct PathResult {
    pub outcome: PathOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    pub path: Vec<Position>,
    pub cost: f64,
}

impl PathResult {
    pub(crate) fn success(path: Vec<Position>, cost: f64) -> Self {
        Self {
            outcome: PathOutcome::Success,
            reason: None,
            path,
            cost,
        }
    }

    /// Best-effort path after an exhausted budget; always carries the
    /// timeout reason.
    pub(crate) fn partial(path: Vec<Position>, cost: f64) -> Self {
        Self {
            outcome: PathOutcome::Partial,
            reason: Some(FailureReason::Timeout),
            path,
            cost,
        }
    }

    pub(crate) fn failure(reason: FailureReason) -> Self {
        Self {
            outcome: PathOutcome::Failed,
            reason: Some(reason),
            path: Vec::new(),
            cost: 0.0,
        }
    }

    /// Whether a complete path was found.
    pub fn is_found(&self) -> bool {
        self.outcome == PathOutcome::Success
    }

    /// Whether the result carries a usable (complete or partial) path.
    pub fn has_path(&self) -> bool {
        matches!(self.outcome, PathOutcome::Success | PathOutcome::Partial)
    }

    /// Number of hops in the path.
    pub fn hop_count(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}
