// ABOUTME: Error types for inventory and service plan execution.
// ABOUTME: Covers missing clusters, placement failures, stopped tasks and poll timeouts.

use crate::aws::ApiError;

/// Errors raised while building or applying a service update plan.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("cluster not found: {0}")]
    ClusterNotFound(String),

    #[error("cluster is not ACTIVE: {0}")]
    ClusterNotActive(String),

    /// ECS reported it cannot place a task (capacity, constraints).
    #[error("failed to place task: {0}")]
    PlacementFailed(String),

    /// A watched task stopped before any watched task reached RUNNING.
    #[error("task stopped before reaching RUNNING: {task}")]
    TaskStopped { task: String },

    #[error("gave up waiting for {what} after {attempts} checks")]
    ConvergenceTimeout { what: String, attempts: u32 },

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanErrorKind {
    ClusterNotFound,
    ClusterNotActive,
    PlacementFailed,
    TaskStopped,
    ConvergenceTimeout,
    Api,
}

impl PlanError {
    pub fn kind(&self) -> PlanErrorKind {
        match self {
            PlanError::ClusterNotFound(_) => PlanErrorKind::ClusterNotFound,
            PlanError::ClusterNotActive(_) => PlanErrorKind::ClusterNotActive,
            PlanError::PlacementFailed(_) => PlanErrorKind::PlacementFailed,
            PlanError::TaskStopped { .. } => PlanErrorKind::TaskStopped,
            PlanError::ConvergenceTimeout { .. } => PlanErrorKind::ConvergenceTimeout,
            PlanError::Api(_) => PlanErrorKind::Api,
        }
    }

    pub(crate) fn timeout(what: impl Into<String>, attempts: u32) -> Self {
        PlanError::ConvergenceTimeout {
            what: what.into(),
            attempts,
        }
    }
}
