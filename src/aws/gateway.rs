// ABOUTME: Rate-limited gateway that wraps every AWS capability.
// ABOUTME: Throttled calls sleep a fixed interval and are retried; other errors pass through.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use super::error::ApiError;
use super::shared_types::{
    AttachmentState, AutoScalingGroup, ClusterInfo, CreateServiceRequest, LiveService,
    RegisterTaskDefinitionRequest, RegisteredTaskDefinition, ScalableTarget,
    ScalableTargetRequest, TargetGroupAttachment, TaskInfo, UpdateServiceRequest,
};
use super::traits::{AppAutoScalingOps, AutoScalingOps, EcsOps, ElbV2Ops};
use crate::types::{ContainerInstanceArn, ServiceArn, TargetGroupArn, TaskArn};

/// How throttled calls are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlePolicy {
    /// Fixed sleep between attempts. Does not grow with the retry count.
    pub delay: Duration,
    /// `None` retries for as long as AWS keeps throttling.
    pub max_retries: Option<u32>,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(15),
            max_retries: None,
        }
    }
}

/// Run `call` until it returns something other than a throttling error.
///
/// The identical call is reissued after each throttling response. Any other
/// error, and any success, is returned to the caller unchanged. When
/// `policy.max_retries` is exhausted the last throttling error is returned.
pub async fn retry_throttled<T, F, Fut>(
    policy: &ThrottlePolicy,
    operation: &str,
    call: F,
) -> Result<T, ApiError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut retries = 0u32;
    loop {
        match call().await {
            Err(err) if err.is_throttling() => {
                if policy.max_retries.is_some_and(|max| retries >= max) {
                    return Err(err);
                }
                retries += 1;
                tracing::warn!(
                    operation,
                    retries,
                    "AWS API throttled: {err}. Retrying in {:?}",
                    policy.delay
                );
                tokio::time::sleep(policy.delay).await;
            }
            other => return other,
        }
    }
}

/// Wraps an AWS backend so that every call goes through [`retry_throttled`].
#[derive(Debug, Clone)]
pub struct RateLimited<A> {
    inner: A,
    policy: ThrottlePolicy,
}

impl<A> RateLimited<A> {
    pub fn new(inner: A, policy: ThrottlePolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

#[async_trait]
impl<A: EcsOps> EcsOps for RateLimited<A> {
    async fn describe_cluster(&self, cluster: &str) -> Result<Option<ClusterInfo>, ApiError> {
        retry_throttled(&self.policy, "ecs:DescribeClusters", || {
            self.inner.describe_cluster(cluster)
        })
        .await
    }

    async fn list_container_instances(
        &self,
        cluster: &str,
    ) -> Result<Vec<ContainerInstanceArn>, ApiError> {
        retry_throttled(&self.policy, "ecs:ListContainerInstances", || {
            self.inner.list_container_instances(cluster)
        })
        .await
    }

    async fn list_services(&self, cluster: &str) -> Result<Vec<ServiceArn>, ApiError> {
        retry_throttled(&self.policy, "ecs:ListServices", || {
            self.inner.list_services(cluster)
        })
        .await
    }

    async fn describe_services(
        &self,
        cluster: &str,
        services: &[String],
    ) -> Result<Vec<LiveService>, ApiError> {
        retry_throttled(&self.policy, "ecs:DescribeServices", || {
            self.inner.describe_services(cluster, services)
        })
        .await
    }

    async fn create_service(
        &self,
        request: &CreateServiceRequest,
    ) -> Result<LiveService, ApiError> {
        retry_throttled(&self.policy, "ecs:CreateService", || {
            self.inner.create_service(request)
        })
        .await
    }

    async fn update_service(
        &self,
        request: &UpdateServiceRequest,
    ) -> Result<LiveService, ApiError> {
        retry_throttled(&self.policy, "ecs:UpdateService", || {
            self.inner.update_service(request)
        })
        .await
    }

    async fn delete_service(&self, cluster: &str, service: &str) -> Result<LiveService, ApiError> {
        retry_throttled(&self.policy, "ecs:DeleteService", || {
            self.inner.delete_service(cluster, service)
        })
        .await
    }

    async fn list_tasks(&self, cluster: &str, service: &str) -> Result<Vec<TaskArn>, ApiError> {
        retry_throttled(&self.policy, "ecs:ListTasks", || {
            self.inner.list_tasks(cluster, service)
        })
        .await
    }

    async fn describe_tasks(
        &self,
        cluster: &str,
        tasks: &[TaskArn],
    ) -> Result<Vec<TaskInfo>, ApiError> {
        retry_throttled(&self.policy, "ecs:DescribeTasks", || {
            self.inner.describe_tasks(cluster, tasks)
        })
        .await
    }

    async fn stop_task(&self, cluster: &str, task: &TaskArn) -> Result<(), ApiError> {
        retry_throttled(&self.policy, "ecs:StopTask", || {
            self.inner.stop_task(cluster, task)
        })
        .await
    }

    async fn register_task_definition(
        &self,
        request: &RegisterTaskDefinitionRequest,
    ) -> Result<RegisteredTaskDefinition, ApiError> {
        retry_throttled(&self.policy, "ecs:RegisterTaskDefinition", || {
            self.inner.register_task_definition(request)
        })
        .await
    }
}

#[async_trait]
impl<A: AutoScalingOps> AutoScalingOps for RateLimited<A> {
    async fn describe_auto_scaling_groups(
        &self,
        names: &[String],
    ) -> Result<BTreeMap<String, AutoScalingGroup>, ApiError> {
        retry_throttled(&self.policy, "autoscaling:DescribeAutoScalingGroups", || {
            self.inner.describe_auto_scaling_groups(names)
        })
        .await
    }

    async fn describe_load_balancer_state(
        &self,
        group: &str,
    ) -> Result<BTreeMap<String, AttachmentState>, ApiError> {
        retry_throttled(&self.policy, "autoscaling:DescribeLoadBalancers", || {
            self.inner.describe_load_balancer_state(group)
        })
        .await
    }

    async fn describe_load_balancer_target_groups(
        &self,
        group: &str,
    ) -> Result<Vec<TargetGroupAttachment>, ApiError> {
        retry_throttled(
            &self.policy,
            "autoscaling:DescribeLoadBalancerTargetGroups",
            || self.inner.describe_load_balancer_target_groups(group),
        )
        .await
    }

    async fn attach_load_balancers(&self, group: &str, names: &[String]) -> Result<(), ApiError> {
        retry_throttled(&self.policy, "autoscaling:AttachLoadBalancers", || {
            self.inner.attach_load_balancers(group, names)
        })
        .await
    }

    async fn detach_load_balancers(&self, group: &str, names: &[String]) -> Result<(), ApiError> {
        retry_throttled(&self.policy, "autoscaling:DetachLoadBalancers", || {
            self.inner.detach_load_balancers(group, names)
        })
        .await
    }

    async fn attach_load_balancer_target_groups(
        &self,
        group: &str,
        arns: &[TargetGroupArn],
    ) -> Result<(), ApiError> {
        retry_throttled(
            &self.policy,
            "autoscaling:AttachLoadBalancerTargetGroups",
            || self.inner.attach_load_balancer_target_groups(group, arns),
        )
        .await
    }

    async fn detach_load_balancer_target_groups(
        &self,
        group: &str,
        arns: &[TargetGroupArn],
    ) -> Result<(), ApiError> {
        retry_throttled(
            &self.policy,
            "autoscaling:DetachLoadBalancerTargetGroups",
            || self.inner.detach_load_balancer_target_groups(group, arns),
        )
        .await
    }
}

#[async_trait]
impl<A: AppAutoScalingOps> AppAutoScalingOps for RateLimited<A> {
    async fn describe_scalable_target(
        &self,
        cluster: &str,
        service: &str,
    ) -> Result<Option<ScalableTarget>, ApiError> {
        retry_throttled(
            &self.policy,
            "application-autoscaling:DescribeScalableTargets",
            || self.inner.describe_scalable_target(cluster, service),
        )
        .await
    }

    async fn register_scalable_target(
        &self,
        request: &ScalableTargetRequest,
    ) -> Result<(), ApiError> {
        retry_throttled(
            &self.policy,
            "application-autoscaling:RegisterScalableTarget",
            || self.inner.register_scalable_target(request),
        )
        .await
    }

    async fn deregister_scalable_target(&self, resource_id: &str) -> Result<(), ApiError> {
        retry_throttled(
            &self.policy,
            "application-autoscaling:DeregisterScalableTarget",
            || self.inner.deregister_scalable_target(resource_id),
        )
        .await
    }
}

#[async_trait]
impl<A: ElbV2Ops> ElbV2Ops for RateLimited<A> {
    async fn describe_target_groups(
        &self,
        names: &[String],
    ) -> Result<BTreeMap<String, TargetGroupArn>, ApiError> {
        retry_throttled(&self.policy, "elbv2:DescribeTargetGroups", || {
            self.inner.describe_target_groups(names)
        })
        .await
    }
}
