// ABOUTME: Applies a service update plan: delete, then create, then update passes.
// ABOUTME: Every mutation is followed by bounded convergence polling.

use crate::aws::shared_types::{
    CreateServiceRequest, LiveService, ScalableTargetRequest, ServiceStatus, UpdateServiceRequest,
};
use crate::aws::{AppAutoScalingOps, EcsOps};
use crate::config::DesiredService;
use crate::diagnostics::{Diagnostics, Warning};
use crate::poll::PollPolicy;
use crate::types::{DeploymentId, TaskArn};

use super::error::PlanError;
use super::plan::{LiveServiceStack, ServiceUpdatePlan};
use super::watch::TaskWatchStatus;

/// ECS reports capacity and constraint problems with this event text.
const PLACEMENT_FAILURE: &str = "was unable to place a task";

/// Drives ECS services to the state described by a [`ServiceUpdatePlan`].
pub struct ServicePlanExecutor<'a, A> {
    api: &'a A,
    poll: PollPolicy,
}

impl<'a, A: EcsOps + AppAutoScalingOps> ServicePlanExecutor<'a, A> {
    pub fn new(api: &'a A, poll: PollPolicy) -> Self {
        Self { api, poll }
    }

    /// Apply plans one after another, stopping at the first failure.
    pub async fn apply_service_plans(
        &self,
        plans: &[ServiceUpdatePlan],
        diag: &mut Diagnostics,
    ) -> Result<(), PlanError> {
        for plan in plans {
            self.apply_service_plan(plan, diag).await?;
        }
        Ok(())
    }

    pub async fn apply_service_plan(
        &self,
        plan: &ServiceUpdatePlan,
        diag: &mut Diagnostics,
    ) -> Result<(), PlanError> {
        let cluster = plan.cluster.as_str();

        for stack in plan.to_delete() {
            self.delete_service(cluster, stack).await?;
        }

        for desired in plan.to_create() {
            self.create_service(cluster, desired).await?;
        }

        for (live, desired) in plan.to_update() {
            self.update_service(cluster, live, desired, diag).await?;
        }

        Ok(())
    }

    async fn delete_service(&self, cluster: &str, stack: &LiveServiceStack) -> Result<(), PlanError> {
        let current = &stack.service;
        tracing::info!(cluster, service = %current.name, "deleting service");

        self.api
            .update_service(&UpdateServiceRequest {
                cluster: cluster.to_string(),
                service: current.name.clone(),
                task_definition: current.task_definition.clone(),
                desired_count: 0,
                deployment_configuration: None,
            })
            .await?;
        tracing::info!(cluster, service = %current.name, "desired count set to 0");

        self.wait_stopped(cluster, &current.name).await?;

        let deleted = self.api.delete_service(cluster, &current.name).await?;
        self.wait_stopped(cluster, &current.name).await?;

        tracing::info!(cluster, service = %deleted.arn, "service deleted");
        Ok(())
    }

    async fn create_service(&self, cluster: &str, desired: &DesiredService) -> Result<(), PlanError> {
        tracing::info!(cluster, service = %desired.name, "creating service");

        let created = self
            .api
            .create_service(&CreateServiceRequest {
                cluster: cluster.to_string(),
                service: desired.name.to_string(),
                task_definition: desired.task_definition.clone(),
                desired_count: desired.desired_count,
                load_balancers: desired.load_balancers.clone(),
                role: desired.role.clone(),
                deployment_configuration: desired.deployment_configuration(),
                placement_constraints: desired.placement_constraints.clone(),
                placement_strategy: desired.placement_strategy.clone(),
            })
            .await?;
        tracing::info!(
            cluster,
            service = %created.arn,
            task_definition = %created.task_definition,
            "service created"
        );

        if let Some(target) = &desired.autoscaling {
            self.api
                .register_scalable_target(&scalable_target_request(cluster, desired, target))
                .await?;
        }

        self.wait_active(cluster, desired.name.as_str()).await?;
        tracing::info!(cluster, service = %desired.name, "service started");
        Ok(())
    }

    async fn update_service(
        &self,
        cluster: &str,
        live: &LiveServiceStack,
        desired: &DesiredService,
        diag: &mut Diagnostics,
    ) -> Result<(), PlanError> {
        let desired_count = desired.next_desired_count(live.service.desired_count);
        tracing::info!(
            cluster,
            service = %desired.name,
            desired_count,
            keep_desired_count = desired.keep_desired_count,
            "updating service"
        );

        let updated = self
            .api
            .update_service(&UpdateServiceRequest {
                cluster: cluster.to_string(),
                service: desired.name.to_string(),
                task_definition: desired.task_definition.clone(),
                desired_count,
                deployment_configuration: desired.deployment_configuration(),
            })
            .await?;
        tracing::info!(
            cluster,
            service = %updated.arn,
            task_definition = %updated.task_definition,
            "launching task definition"
        );

        self.reconcile_autoscaling(cluster, live, desired).await?;

        if let Some(outgoing) = outgoing_deployment(&updated) {
            self.stop_deployment_tasks(cluster, &updated.name, outgoing, diag)
                .await?;
        }

        self.wait_active(cluster, desired.name.as_str()).await?;
        tracing::info!(cluster, service = %desired.name, "service updated");
        Ok(())
    }

    /// Register the declared scalable target, or drop a live one that is no
    /// longer declared.
    async fn reconcile_autoscaling(
        &self,
        cluster: &str,
        live: &LiveServiceStack,
        desired: &DesiredService,
    ) -> Result<(), PlanError> {
        match (&desired.autoscaling, &live.autoscaling) {
            (Some(target), _) => {
                self.api
                    .register_scalable_target(&scalable_target_request(cluster, desired, target))
                    .await?;
                tracing::info!(
                    service = %desired.name,
                    min_capacity = target.min_capacity,
                    max_capacity = target.max_capacity,
                    "registered scalable target"
                );
            }
            (None, Some(existing)) => {
                self.api
                    .deregister_scalable_target(&existing.resource_id)
                    .await?;
                tracing::info!(resource_id = %existing.resource_id, "deregistered scalable target");
            }
            (None, None) => {}
        }
        Ok(())
    }

    /// Stop the running tasks launched by `deployment`. Failures are
    /// recorded as warnings.
    async fn stop_deployment_tasks(
        &self,
        cluster: &str,
        service: &str,
        deployment: &DeploymentId,
        diag: &mut Diagnostics,
    ) -> Result<(), PlanError> {
        let task_arns = self.api.list_tasks(cluster, service).await?;
        if task_arns.is_empty() {
            return Ok(());
        }

        let tasks = self.api.describe_tasks(cluster, &task_arns).await?;
        for task in tasks
            .iter()
            .filter(|t| t.started_by.as_deref() == Some(deployment.as_str()))
        {
            match self.api.stop_task(cluster, &task.arn).await {
                Ok(()) => tracing::info!(task = %task.arn, "stopped task"),
                Err(e) => diag.warn(Warning::task_stop_failed(task.arn.as_str(), e)),
            }
        }
        Ok(())
    }

    /// Poll until the service has no running tasks and is not draining, or
    /// is gone.
    pub async fn wait_stopped(&self, cluster: &str, service: &str) -> Result<(), PlanError> {
        let mut ticker = self.poll.ticker();
        while ticker.tick().await {
            let Some(current) = self.describe_one(cluster, service).await? else {
                return Ok(());
            };

            tracing::info!(
                cluster,
                service,
                status = %current.status,
                running = current.running_count,
                "waiting for service to stop"
            );
            if current.running_count == 0 && current.status != ServiceStatus::Draining {
                return Ok(());
            }
        }
        Err(PlanError::timeout(
            format!("service '{service}' on '{cluster}' to stop"),
            ticker.attempts(),
        ))
    }

    /// Poll until at least one of the service's tasks is RUNNING.
    ///
    /// Fails immediately on a placement failure event or when a watched task
    /// stops first. The task set is captured the first time the service has
    /// any tasks and is not refreshed afterwards.
    pub async fn wait_active(&self, cluster: &str, service: &str) -> Result<(), PlanError> {
        let mut watched: Option<Vec<TaskArn>> = None;
        let mut ticker = self.poll.ticker();

        while ticker.tick().await {
            let Some(current) = self.describe_one(cluster, service).await? else {
                continue;
            };

            tracing::info!(cluster, service, status = %current.status, "waiting for service to become active");
            if current.status != ServiceStatus::Active {
                continue;
            }

            if let Some(message) = current.latest_event() {
                if message.contains(PLACEMENT_FAILURE) {
                    return Err(PlanError::PlacementFailed(message.to_string()));
                }
            }

            if watched.is_none() {
                let tasks = self.api.list_tasks(cluster, service).await?;
                if tasks.is_empty() {
                    continue;
                }
                watched = Some(tasks);
            }
            let Some(task_arns) = watched.as_deref() else {
                continue;
            };

            let tasks = self.api.describe_tasks(cluster, task_arns).await?;
            for task in &tasks {
                tracing::debug!(task = %task.arn, status = %task.last_status, "watched task");
            }

            match TaskWatchStatus::from_tasks(&tasks) {
                TaskWatchStatus::Finish => {
                    tracing::info!(cluster, service, "at least one task is running");
                    return Ok(());
                }
                TaskWatchStatus::Terminate { task } => {
                    return Err(PlanError::TaskStopped { task });
                }
                TaskWatchStatus::Continue => {}
            }
        }
        Err(PlanError::timeout(
            format!("service '{service}' on '{cluster}' to become active"),
            ticker.attempts(),
        ))
    }

    async fn describe_one(&self, cluster: &str, service: &str) -> Result<Option<LiveService>, PlanError> {
        let mut services = self
            .api
            .describe_services(cluster, &[service.to_string()])
            .await?;
        Ok(services.pop())
    }
}

/// The deployment being replaced: with two or more deployments, the one
/// ECS marks ACTIVE; with exactly one, that one.
pub fn outgoing_deployment(service: &LiveService) -> Option<&DeploymentId> {
    match service.deployments.as_slice() {
        [] => None,
        [only] => Some(&only.id),
        many => many
            .iter()
            .rev()
            .find(|d| d.status == "ACTIVE")
            .map(|d| &d.id),
    }
}

fn scalable_target_request(
    cluster: &str,
    desired: &DesiredService,
    target: &crate::config::AutoScalingTarget,
) -> ScalableTargetRequest {
    ScalableTargetRequest {
        cluster: cluster.to_string(),
        service: desired.name.to_string(),
        min_capacity: target.min_capacity,
        max_capacity: target.max_capacity,
        role_arn: target.role.clone(),
    }
}
