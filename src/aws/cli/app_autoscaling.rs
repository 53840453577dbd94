// ABOUTME: AppAutoScalingOps over `aws application-autoscaling`.
// ABOUTME: Every call is scoped to the ECS service desired-count dimension.

use async_trait::async_trait;

use super::responses::DescribeScalableTargets;
use super::{AwsCli, flag};
use crate::aws::error::ApiError;
use crate::aws::shared_types::{ScalableTarget, ScalableTargetRequest, service_resource_id};
use crate::aws::traits::AppAutoScalingOps;

const SERVICE_NAMESPACE: &str = "ecs";
const SCALABLE_DIMENSION: &str = "ecs:service:DesiredCount";

fn scoped(mut args: Vec<String>) -> Vec<String> {
    args.extend(flag("--service-namespace", SERVICE_NAMESPACE));
    args.extend(flag("--scalable-dimension", SCALABLE_DIMENSION));
    args
}

#[async_trait]
impl AppAutoScalingOps for AwsCli {
    async fn describe_scalable_target(
        &self,
        cluster: &str,
        service: &str,
    ) -> Result<Option<ScalableTarget>, ApiError> {
        let args = scoped(
            flag("--resource-ids", service_resource_id(cluster, service)).to_vec(),
        );
        let out: DescribeScalableTargets = self
            .call("application-autoscaling", "describe-scalable-targets", &args)
            .await?;
        Ok(out.scalable_targets.into_iter().next().map(ScalableTarget::from))
    }

    async fn register_scalable_target(
        &self,
        request: &ScalableTargetRequest,
    ) -> Result<(), ApiError> {
        let mut args = flag(
            "--resource-id",
            service_resource_id(&request.cluster, &request.service),
        )
        .to_vec();
        args.extend(flag("--min-capacity", request.min_capacity));
        args.extend(flag("--max-capacity", request.max_capacity));
        args.extend(flag("--role-arn", &request.role_arn));
        self.call_unit(
            "application-autoscaling",
            "register-scalable-target",
            &scoped(args),
        )
        .await
    }

    async fn deregister_scalable_target(&self, resource_id: &str) -> Result<(), ApiError> {
        self.call_unit(
            "application-autoscaling",
            "deregister-scalable-target",
            &scoped(flag("--resource-id", resource_id).to_vec()),
        )
        .await
    }
}
