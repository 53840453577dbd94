// ABOUTME: EC2 Auto Scaling operations trait.
// ABOUTME: Group lookup and load balancer / target group attachment management.

use crate::aws::error::ApiError;
use crate::aws::shared_types::{AttachmentState, AutoScalingGroup, TargetGroupAttachment};
use crate::types::TargetGroupArn;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Autoscaling group operations.
#[async_trait]
pub trait AutoScalingOps: Send + Sync {
    /// Describe several groups in one call, keyed by group name. Unknown
    /// names are absent from the map.
    async fn describe_auto_scaling_groups(
        &self,
        names: &[String],
    ) -> Result<BTreeMap<String, AutoScalingGroup>, ApiError>;

    /// Classic load balancers attached to the group, keyed by LB name.
    async fn describe_load_balancer_state(
        &self,
        group: &str,
    ) -> Result<BTreeMap<String, AttachmentState>, ApiError>;

    async fn describe_load_balancer_target_groups(
        &self,
        group: &str,
    ) -> Result<Vec<TargetGroupAttachment>, ApiError>;

    async fn attach_load_balancers(&self, group: &str, names: &[String])
    -> Result<(), ApiError>;

    async fn detach_load_balancers(&self, group: &str, names: &[String])
    -> Result<(), ApiError>;

    async fn attach_load_balancer_target_groups(
        &self,
        group: &str,
        arns: &[TargetGroupArn],
    ) -> Result<(), ApiError>;

    async fn detach_load_balancer_target_groups(
        &self,
        group: &str,
        arns: &[TargetGroupArn],
    ) -> Result<(), ApiError>;
}
