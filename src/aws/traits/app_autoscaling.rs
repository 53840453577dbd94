// ABOUTME: Application Auto Scaling operations trait.
// ABOUTME: Scalable targets for an ECS service's desired count.

use crate::aws::error::ApiError;
use crate::aws::shared_types::{ScalableTarget, ScalableTargetRequest};
use async_trait::async_trait;

#[async_trait]
pub trait AppAutoScalingOps: Send + Sync {
    /// `None` when autoscaling is not configured for the service.
    async fn describe_scalable_target(
        &self,
        cluster: &str,
        service: &str,
    ) -> Result<Option<ScalableTarget>, ApiError>;

    /// Register or overwrite the scalable target.
    async fn register_scalable_target(
        &self,
        request: &ScalableTargetRequest,
    ) -> Result<(), ApiError>;

    async fn deregister_scalable_target(&self, resource_id: &str) -> Result<(), ApiError>;
}
