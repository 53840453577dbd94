// ABOUTME: Error types for blue-green plan construction and traffic switching.
// ABOUTME: A failed switch is reported at the step that failed, with no compensation.

use crate::aws::ApiError;
use crate::plan::PlanError;

use super::plan::Side;

#[derive(Debug, thiserror::Error)]
pub enum SwitchError {
    #[error("{side} service '{service}' not found on cluster '{cluster}'")]
    ServiceNotFound {
        side: Side,
        cluster: String,
        service: String,
    },

    #[error("{side} autoscaling group not found: {group}")]
    AutoScalingGroupNotFound { side: Side, group: String },

    #[error("{side} ECS cluster has no plan (missing or without container instances): {cluster}")]
    ClusterPlanNotFound { side: Side, cluster: String },

    #[error("load balancer '{load_balancer}' is not attached to autoscaling group '{group}'")]
    LoadBalancerMissing { group: String, load_balancer: String },

    #[error("target group '{target_group}' is not attached to autoscaling group '{group}'")]
    TargetGroupMissing { group: String, target_group: String },

    #[error("target group not found: {0}")]
    UnresolvedTargetGroup(String),

    #[error("gave up waiting for {what} after {attempts} checks")]
    ConvergenceTimeout { what: String, attempts: u32 },

    #[error("deploy failed: {0}")]
    Deploy(#[from] PlanError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchErrorKind {
    /// A side's service, group or cluster plan is missing.
    MissingResource,
    /// A load balancer or target group is not where the switch expects it.
    Attachment,
    ConvergenceTimeout,
    Deploy,
    Api,
}

impl SwitchError {
    pub fn kind(&self) -> SwitchErrorKind {
        match self {
            SwitchError::ServiceNotFound { .. }
            | SwitchError::AutoScalingGroupNotFound { .. }
            | SwitchError::ClusterPlanNotFound { .. }
            | SwitchError::UnresolvedTargetGroup(_) => SwitchErrorKind::MissingResource,
            SwitchError::LoadBalancerMissing { .. } | SwitchError::TargetGroupMissing { .. } => {
                SwitchErrorKind::Attachment
            }
            SwitchError::ConvergenceTimeout { .. } => SwitchErrorKind::ConvergenceTimeout,
            SwitchError::Deploy(_) => SwitchErrorKind::Deploy,
            SwitchError::Api(_) => SwitchErrorKind::Api,
        }
    }
}
