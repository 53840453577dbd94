// ABOUTME: EcsOps over `aws ecs`.
// ABOUTME: Batches describe calls to the API's per-request limits; mutations go through --cli-input-json.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::responses::{
    DescribeClusters, DescribeServices, DescribeTasks, ListContainerInstances, ListServices,
    ListTasks, RegisterTaskDefinition, SingleService,
};
use super::{AwsCli, flag, list_flag};
use crate::aws::error::ApiError;
use crate::aws::shared_types::{
    ClusterInfo, CreateServiceRequest, LiveService, LoadBalancerBinding, LoadBalancerTarget,
    RegisterTaskDefinitionRequest, RegisteredTaskDefinition, TaskInfo, UpdateServiceRequest,
};
use crate::aws::traits::EcsOps;
use crate::types::{ContainerInstanceArn, ServiceArn, TaskArn};

const DESCRIBE_SERVICES_BATCH: usize = 10;
const DESCRIBE_TASKS_BATCH: usize = 100;

#[async_trait]
impl EcsOps for AwsCli {
    async fn describe_cluster(&self, cluster: &str) -> Result<Option<ClusterInfo>, ApiError> {
        let out: DescribeClusters = self
            .call("ecs", "describe-clusters", &list_flag("--clusters", &[cluster]))
            .await?;

        if let Some(failure) = out.failures.first() {
            tracing::debug!(
                cluster,
                reason = failure.reason.as_deref().unwrap_or("unknown"),
                "describe-clusters reported a failure"
            );
        }

        Ok(out.clusters.into_iter().next().map(|c| ClusterInfo {
            name: c.cluster_name,
            status: c.status,
        }))
    }

    async fn list_container_instances(
        &self,
        cluster: &str,
    ) -> Result<Vec<ContainerInstanceArn>, ApiError> {
        let out: ListContainerInstances = self
            .call("ecs", "list-container-instances", &flag("--cluster", cluster))
            .await?;
        Ok(out.container_instance_arns)
    }

    async fn list_services(&self, cluster: &str) -> Result<Vec<ServiceArn>, ApiError> {
        let out: ListServices = self
            .call("ecs", "list-services", &flag("--cluster", cluster))
            .await?;
        Ok(out.service_arns)
    }

    async fn describe_services(
        &self,
        cluster: &str,
        services: &[String],
    ) -> Result<Vec<LiveService>, ApiError> {
        let mut described = Vec::with_capacity(services.len());
        for chunk in services.chunks(DESCRIBE_SERVICES_BATCH) {
            let mut args = flag("--cluster", cluster).to_vec();
            args.extend(list_flag("--services", chunk));
            let out: DescribeServices = self.call("ecs", "describe-services", &args).await?;
            described.extend(out.services.into_iter().map(LiveService::from));
        }
        Ok(described)
    }

    async fn create_service(
        &self,
        request: &CreateServiceRequest,
    ) -> Result<LiveService, ApiError> {
        let input = create_service_input(request);
        let out: SingleService = self
            .call("ecs", "create-service", &flag("--cli-input-json", input))
            .await?;
        Ok(out.service.into())
    }

    async fn update_service(
        &self,
        request: &UpdateServiceRequest,
    ) -> Result<LiveService, ApiError> {
        let input = update_service_input(request);
        let out: SingleService = self
            .call("ecs", "update-service", &flag("--cli-input-json", input))
            .await?;
        Ok(out.service.into())
    }

    async fn delete_service(&self, cluster: &str, service: &str) -> Result<LiveService, ApiError> {
        let mut args = flag("--cluster", cluster).to_vec();
        args.extend(flag("--service", service));
        let out: SingleService = self.call("ecs", "delete-service", &args).await?;
        Ok(out.service.into())
    }

    async fn list_tasks(&self, cluster: &str, service: &str) -> Result<Vec<TaskArn>, ApiError> {
        let mut args = flag("--cluster", cluster).to_vec();
        args.extend(flag("--service-name", service));
        let out: ListTasks = self.call("ecs", "list-tasks", &args).await?;
        Ok(out.task_arns)
    }

    async fn describe_tasks(
        &self,
        cluster: &str,
        tasks: &[TaskArn],
    ) -> Result<Vec<TaskInfo>, ApiError> {
        let mut described = Vec::with_capacity(tasks.len());
        for chunk in tasks.chunks(DESCRIBE_TASKS_BATCH) {
            let mut args = flag("--cluster", cluster).to_vec();
            args.extend(list_flag("--tasks", chunk));
            let out: DescribeTasks = self.call("ecs", "describe-tasks", &args).await?;
            described.extend(out.tasks.into_iter().map(TaskInfo::from));
        }
        Ok(described)
    }

    async fn stop_task(&self, cluster: &str, task: &TaskArn) -> Result<(), ApiError> {
        let mut args = flag("--cluster", cluster).to_vec();
        args.extend(flag("--task", task));
        self.call_unit("ecs", "stop-task", &args).await
    }

    async fn register_task_definition(
        &self,
        request: &RegisterTaskDefinitionRequest,
    ) -> Result<RegisteredTaskDefinition, ApiError> {
        let input = json!({
            "family": request.family,
            "containerDefinitions": request.container_definitions,
        });
        let out: RegisterTaskDefinition = self
            .call("ecs", "register-task-definition", &flag("--cli-input-json", input))
            .await?;
        Ok(out.task_definition.into())
    }
}

fn load_balancer_input(binding: &LoadBalancerBinding) -> Value {
    let mut lb = json!({
        "containerName": binding.container_name,
        "containerPort": binding.container_port,
    });
    match &binding.target {
        LoadBalancerTarget::Classic(name) => lb["loadBalancerName"] = json!(name),
        LoadBalancerTarget::TargetGroup(arn) => lb["targetGroupArn"] = json!(arn.as_str()),
    }
    lb
}

fn create_service_input(request: &CreateServiceRequest) -> Value {
    let mut input = json!({
        "cluster": request.cluster,
        "serviceName": request.service,
        "taskDefinition": request.task_definition,
        "desiredCount": request.desired_count,
    });

    if !request.load_balancers.is_empty() {
        input["loadBalancers"] =
            Value::Array(request.load_balancers.iter().map(load_balancer_input).collect());
    }
    if let Some(role) = &request.role {
        input["role"] = json!(role);
    }
    if let Some(config) = &request.deployment_configuration {
        input["deploymentConfiguration"] = json!({
            "minimumHealthyPercent": config.minimum_healthy_percent,
            "maximumPercent": config.maximum_percent,
        });
    }
    if !request.placement_constraints.is_empty() {
        input["placementConstraints"] = json!(request.placement_constraints);
    }
    if !request.placement_strategy.is_empty() {
        input["placementStrategy"] = json!(request.placement_strategy);
    }
    input
}

fn update_service_input(request: &UpdateServiceRequest) -> Value {
    let mut input = json!({
        "cluster": request.cluster,
        "service": request.service,
        "taskDefinition": request.task_definition,
        "desiredCount": request.desired_count,
    });
    if let Some(config) = &request.deployment_configuration {
        input["deploymentConfiguration"] = json!({
            "minimumHealthyPercent": config.minimum_healthy_percent,
            "maximumPercent": config.maximum_percent,
        });
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::shared_types::{DeploymentConfiguration, PlacementStrategy};
    use crate::types::TargetGroupArn;

    #[test]
    fn create_input_uses_ecs_field_names() {
        let request = CreateServiceRequest {
            cluster: "api".to_string(),
            service: "web".to_string(),
            task_definition: "web:3".to_string(),
            desired_count: 2,
            load_balancers: vec![LoadBalancerBinding {
                target: LoadBalancerTarget::TargetGroup(TargetGroupArn::new("arn:tg")),
                container_name: "web".to_string(),
                container_port: 8080,
            }],
            role: Some("ecsServiceRole".to_string()),
            deployment_configuration: Some(DeploymentConfiguration {
                minimum_healthy_percent: 50,
                maximum_percent: 200,
            }),
            placement_constraints: vec![],
            placement_strategy: vec![PlacementStrategy {
                kind: "spread".to_string(),
                field: Some("attribute:ecs.availability-zone".to_string()),
            }],
        };

        let input = create_service_input(&request);

        assert_eq!(input["serviceName"], "web");
        assert_eq!(input["loadBalancers"][0]["targetGroupArn"], "arn:tg");
        assert!(input["loadBalancers"][0].get("loadBalancerName").is_none());
        assert_eq!(input["deploymentConfiguration"]["maximumPercent"], 200);
        assert_eq!(input["placementStrategy"][0]["type"], "spread");
        assert!(input.get("placementConstraints").is_none());
    }

    #[test]
    fn update_input_omits_missing_deployment_configuration() {
        let request = UpdateServiceRequest {
            cluster: "api".to_string(),
            service: "web".to_string(),
            task_definition: "web:4".to_string(),
            desired_count: 3,
            deployment_configuration: None,
        };

        let input = update_service_input(&request);

        assert_eq!(input["service"], "web");
        assert_eq!(input["desiredCount"], 3);
        assert!(input.get("deploymentConfiguration").is_none());
    }
}
