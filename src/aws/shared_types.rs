// ABOUTME: Shared types used across the AWS capability traits.
// ABOUTME: Live ECS services and tasks, task definitions, autoscaling groups, attachment states, requests.

use crate::types::{DeploymentId, ServiceArn, TargetGroupArn, TaskArn, TaskDefinitionArn};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// ECS clusters and services
// =============================================================================

/// A cluster as returned by `DescribeClusters`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterInfo {
    pub name: String,
    pub status: String,
}

impl ClusterInfo {
    pub fn is_active(&self) -> bool {
        self.status == "ACTIVE"
    }
}

/// Lifecycle status of an ECS service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ServiceStatus {
    Active,
    Draining,
    Inactive,
    Other(String),
}

impl ServiceStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "ACTIVE" => ServiceStatus::Active,
            "DRAINING" => ServiceStatus::Draining,
            "INACTIVE" => ServiceStatus::Inactive,
            other => ServiceStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceStatus::Active => write!(f, "ACTIVE"),
            ServiceStatus::Draining => write!(f, "DRAINING"),
            ServiceStatus::Inactive => write!(f, "INACTIVE"),
            ServiceStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

/// A live ECS service record.
#[derive(Debug, Clone, Serialize)]
pub struct LiveService {
    pub name: String,
    pub arn: ServiceArn,
    pub status: ServiceStatus,
    pub task_definition: String,
    pub desired_count: u32,
    pub running_count: u32,
    pub pending_count: u32,
    pub load_balancers: Vec<LoadBalancerBinding>,
    pub deployments: Vec<ServiceDeployment>,
    /// Newest first, as ECS returns them.
    pub events: Vec<ServiceEvent>,
}

impl LiveService {
    /// Message of the most recent service event, if any.
    pub fn latest_event(&self) -> Option<&str> {
        self.events.first().map(|e| e.message.as_str())
    }
}

/// One deployment of a service. ECS marks the newest one PRIMARY and
/// any still-draining older ones ACTIVE.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceDeployment {
    pub id: DeploymentId,
    pub status: String,
    pub task_definition: String,
    pub desired_count: u32,
    pub running_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceEvent {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub message: String,
}

/// Where a service's containers are registered for traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadBalancerTarget {
    /// Classic load balancer, by name.
    Classic(String),
    /// ALB/NLB target group, by ARN.
    TargetGroup(TargetGroupArn),
}

impl fmt::Display for LoadBalancerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadBalancerTarget::Classic(name) => write!(f, "elb:{name}"),
            LoadBalancerTarget::TargetGroup(arn) => write!(f, "target-group:{arn}"),
        }
    }
}

/// A load balancer binding for one container port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLoadBalancerBinding")]
pub struct LoadBalancerBinding {
    pub target: LoadBalancerTarget,
    pub container_name: String,
    pub container_port: u16,
}

#[derive(Deserialize)]
struct RawLoadBalancerBinding {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    target_group_arn: Option<String>,
    container_name: String,
    container_port: u16,
}

impl TryFrom<RawLoadBalancerBinding> for LoadBalancerBinding {
    type Error = String;

    fn try_from(raw: RawLoadBalancerBinding) -> Result<Self, Self::Error> {
        let target = match (raw.name, raw.target_group_arn) {
            (Some(name), None) => LoadBalancerTarget::Classic(name),
            (None, Some(arn)) => LoadBalancerTarget::TargetGroup(TargetGroupArn::new(arn)),
            (Some(_), Some(_)) => {
                return Err(format!(
                    "load balancer for container '{}' sets both name and target_group_arn",
                    raw.container_name
                ));
            }
            (None, None) => {
                return Err(format!(
                    "load balancer for container '{}' needs name or target_group_arn",
                    raw.container_name
                ));
            }
        };

        Ok(LoadBalancerBinding {
            target,
            container_name: raw.container_name,
            container_port: raw.container_port,
        })
    }
}

/// Minimum healthy / maximum percent during a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeploymentConfiguration {
    pub minimum_healthy_percent: u32,
    pub maximum_percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementConstraint {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementStrategy {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Input for `CreateService`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateServiceRequest {
    pub cluster: String,
    pub service: String,
    pub task_definition: String,
    pub desired_count: u32,
    pub load_balancers: Vec<LoadBalancerBinding>,
    pub role: Option<String>,
    pub deployment_configuration: Option<DeploymentConfiguration>,
    pub placement_constraints: Vec<PlacementConstraint>,
    pub placement_strategy: Vec<PlacementStrategy>,
}

/// Input for `UpdateService`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateServiceRequest {
    pub cluster: String,
    pub service: String,
    pub task_definition: String,
    pub desired_count: u32,
    pub deployment_configuration: Option<DeploymentConfiguration>,
}

// =============================================================================
// ECS tasks
// =============================================================================

/// Last known status of an ECS task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TaskStatus {
    Provisioning,
    Pending,
    Activating,
    Running,
    Deactivating,
    Stopping,
    Deprovisioning,
    Stopped,
    Other(String),
}

impl TaskStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "PROVISIONING" => TaskStatus::Provisioning,
            "PENDING" => TaskStatus::Pending,
            "ACTIVATING" => TaskStatus::Activating,
            "RUNNING" => TaskStatus::Running,
            "DEACTIVATING" => TaskStatus::Deactivating,
            "STOPPING" => TaskStatus::Stopping,
            "DEPROVISIONING" => TaskStatus::Deprovisioning,
            "STOPPED" => TaskStatus::Stopped,
            other => TaskStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Provisioning => "PROVISIONING",
            TaskStatus::Pending => "PENDING",
            TaskStatus::Activating => "ACTIVATING",
            TaskStatus::Running => "RUNNING",
            TaskStatus::Deactivating => "DEACTIVATING",
            TaskStatus::Stopping => "STOPPING",
            TaskStatus::Deprovisioning => "DEPROVISIONING",
            TaskStatus::Stopped => "STOPPED",
            TaskStatus::Other(s) => s,
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskInfo {
    pub arn: TaskArn,
    pub last_status: TaskStatus,
    /// For service tasks this is the id of the deployment that launched the task.
    pub started_by: Option<String>,
    pub containers: Vec<TaskContainer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskContainer {
    pub name: String,
    pub last_status: String,
}

// =============================================================================
// Autoscaling groups and load balancer attachments
// =============================================================================

/// An autoscaling group with its current load balancer attachments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoScalingGroup {
    pub name: String,
    pub load_balancer_names: Vec<String>,
    pub target_group_arns: Vec<TargetGroupArn>,
}

/// State of a load balancer or target group attached to an autoscaling group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AttachmentState {
    Adding,
    Added,
    InService,
    Removing,
    Removed,
    Other(String),
}

impl AttachmentState {
    pub fn parse(value: &str) -> Self {
        match value {
            "Adding" => AttachmentState::Adding,
            "Added" => AttachmentState::Added,
            "InService" => AttachmentState::InService,
            "Removing" => AttachmentState::Removing,
            "Removed" => AttachmentState::Removed,
            other => AttachmentState::Other(other.to_string()),
        }
    }

    /// `Added`: all instances registered. `InService`: at least one
    /// instance passed the load balancer health check.
    pub fn is_serving(&self) -> bool {
        matches!(self, AttachmentState::Added | AttachmentState::InService)
    }
}

impl fmt::Display for AttachmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentState::Adding => write!(f, "Adding"),
            AttachmentState::Added => write!(f, "Added"),
            AttachmentState::InService => write!(f, "InService"),
            AttachmentState::Removing => write!(f, "Removing"),
            AttachmentState::Removed => write!(f, "Removed"),
            AttachmentState::Other(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetGroupAttachment {
    pub arn: TargetGroupArn,
    pub state: AttachmentState,
}

// =============================================================================
// Application Auto Scaling
// =============================================================================

/// Application Auto Scaling target for a service's desired count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScalableTarget {
    pub resource_id: String,
    pub min_capacity: u32,
    pub max_capacity: u32,
    pub role_arn: Option<String>,
}

/// Input for `RegisterScalableTarget`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScalableTargetRequest {
    pub cluster: String,
    pub service: String,
    pub min_capacity: u32,
    pub max_capacity: u32,
    pub role_arn: String,
}

// =============================================================================
// Task definitions
// =============================================================================

/// Input to `RegisterTaskDefinition`. Container definitions are ECS JSON
/// objects and are sent as given.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterTaskDefinitionRequest {
    pub family: String,
    pub container_definitions: Vec<serde_json::Value>,
}

/// A task definition revision as returned by `RegisterTaskDefinition`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredTaskDefinition {
    pub arn: TaskDefinitionArn,
    pub family: String,
    pub revision: u32,
}

impl RegisteredTaskDefinition {
    /// `family:revision`, the form services reference.
    pub fn reference(&self) -> String {
        format!("{}:{}", self.family, self.revision)
    }
}

/// Resource id Application Auto Scaling uses for an ECS service.
pub fn service_resource_id(cluster: &str, service: &str) -> String {
    format!("service/{cluster}/{service}")
}
