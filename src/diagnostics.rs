// ABOUTME: Diagnostics accumulator for non-fatal warnings during plan and apply.
// ABOUTME: Collects warnings that shouldn't abort a run but should be shown to users.

use serde::Serialize;

/// Collects non-fatal warnings during plan and apply operations.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning.
#[derive(Debug, Clone, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// A cluster with no registered container instances was skipped.
    pub fn empty_cluster(cluster: &str) -> Self {
        Self {
            kind: WarningKind::EmptyCluster,
            message: format!("cluster '{cluster}' has no container instances, skipping"),
        }
    }

    /// An outgoing task could not be stopped; ECS will replace it eventually.
    pub fn task_stop_failed(task: &str, reason: impl std::fmt::Display) -> Self {
        Self {
            kind: WarningKind::TaskStopFailed,
            message: format!("failed to stop task {task}: {reason}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    EmptyCluster,
    TaskStopFailed,
}
