// ABOUTME: ECS operations trait.
// ABOUTME: Clusters, container instances, services, tasks and task definitions.

use crate::aws::error::ApiError;
use crate::aws::shared_types::{
    ClusterInfo, CreateServiceRequest, LiveService, RegisterTaskDefinitionRequest,
    RegisteredTaskDefinition, TaskInfo, UpdateServiceRequest,
};
use crate::types::{ContainerInstanceArn, ServiceArn, TaskArn};
use async_trait::async_trait;

/// ECS cluster, service and task operations.
#[async_trait]
pub trait EcsOps: Send + Sync {
    /// Describe a cluster. `None` when ECS reports it as a failure (missing).
    async fn describe_cluster(&self, cluster: &str) -> Result<Option<ClusterInfo>, ApiError>;

    async fn list_container_instances(
        &self,
        cluster: &str,
    ) -> Result<Vec<ContainerInstanceArn>, ApiError>;

    async fn list_services(&self, cluster: &str) -> Result<Vec<ServiceArn>, ApiError>;

    /// Describe services by name or ARN. Services that do not exist are
    /// omitted from the result.
    async fn describe_services(
        &self,
        cluster: &str,
        services: &[String],
    ) -> Result<Vec<LiveService>, ApiError>;

    async fn create_service(&self, request: &CreateServiceRequest)
    -> Result<LiveService, ApiError>;

    async fn update_service(&self, request: &UpdateServiceRequest)
    -> Result<LiveService, ApiError>;

    async fn delete_service(&self, cluster: &str, service: &str)
    -> Result<LiveService, ApiError>;

    /// ARNs of the service's tasks whose desired status is RUNNING.
    async fn list_tasks(&self, cluster: &str, service: &str) -> Result<Vec<TaskArn>, ApiError>;

    async fn describe_tasks(
        &self,
        cluster: &str,
        tasks: &[TaskArn],
    ) -> Result<Vec<TaskInfo>, ApiError>;

    async fn stop_task(&self, cluster: &str, task: &TaskArn) -> Result<(), ApiError>;

    /// Register a new revision of the request's family.
    async fn register_task_definition(
        &self,
        request: &RegisterTaskDefinitionRequest,
    ) -> Result<RegisteredTaskDefinition, ApiError>;
}
