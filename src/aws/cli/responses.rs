// ABOUTME: Raw JSON shapes printed by the `aws` CLI.
// ABOUTME: ECS is camelCase; Auto Scaling, ELBv2 and Application Auto Scaling are PascalCase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::aws::shared_types::{
    AttachmentState, AutoScalingGroup, LiveService, LoadBalancerBinding, LoadBalancerTarget,
    RegisteredTaskDefinition, ScalableTarget, ServiceDeployment, ServiceEvent, ServiceStatus, TargetGroupAttachment,
    TaskContainer, TaskInfo, TaskStatus,
};
use crate::types::{
    ContainerInstanceArn, DeploymentId, ServiceArn, TargetGroupArn, TaskArn, TaskDefinitionArn,
};

// =============================================================================
// ECS
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeClusters {
    #[serde(default)]
    pub clusters: Vec<RawCluster>,
    #[serde(default)]
    pub failures: Vec<RawFailure>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCluster {
    pub cluster_name: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFailure {
    #[serde(default)]
    pub arn: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListContainerInstances {
    #[serde(default)]
    pub container_instance_arns: Vec<ContainerInstanceArn>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListServices {
    #[serde(default)]
    pub service_arns: Vec<ServiceArn>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeServices {
    #[serde(default)]
    pub services: Vec<RawService>,
}

#[derive(Debug, Deserialize)]
pub struct SingleService {
    pub service: RawService,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawService {
    pub service_name: String,
    pub service_arn: ServiceArn,
    pub status: String,
    #[serde(default)]
    pub task_definition: String,
    #[serde(default)]
    pub desired_count: u32,
    #[serde(default)]
    pub running_count: u32,
    #[serde(default)]
    pub pending_count: u32,
    #[serde(default)]
    pub load_balancers: Vec<RawLoadBalancer>,
    #[serde(default)]
    pub deployments: Vec<RawDeployment>,
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLoadBalancer {
    #[serde(default)]
    pub load_balancer_name: Option<String>,
    #[serde(default)]
    pub target_group_arn: Option<String>,
    #[serde(default)]
    pub container_name: String,
    #[serde(default)]
    pub container_port: u16,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDeployment {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub task_definition: String,
    #[serde(default)]
    pub desired_count: u32,
    #[serde(default)]
    pub running_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasks {
    #[serde(default)]
    pub task_arns: Vec<TaskArn>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeTasks {
    #[serde(default)]
    pub tasks: Vec<RawTask>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTask {
    pub task_arn: TaskArn,
    #[serde(default)]
    pub last_status: String,
    #[serde(default)]
    pub started_by: Option<String>,
    #[serde(default)]
    pub containers: Vec<RawContainer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContainer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub last_status: String,
}

/// CLI v2 prints ISO 8601 strings, CLI v1 prints epoch seconds.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Some(serde_json::Value::Number(n)) => n.as_f64().and_then(|secs| {
            DateTime::from_timestamp(secs.trunc() as i64, (secs.fract() * 1e9) as u32)
        }),
        _ => None,
    })
}

impl From<RawService> for LiveService {
    fn from(raw: RawService) -> Self {
        LiveService {
            name: raw.service_name,
            arn: raw.service_arn,
            status: ServiceStatus::parse(&raw.status),
            task_definition: raw.task_definition,
            desired_count: raw.desired_count,
            running_count: raw.running_count,
            pending_count: raw.pending_count,
            load_balancers: raw
                .load_balancers
                .into_iter()
                .filter_map(RawLoadBalancer::into_binding)
                .collect(),
            deployments: raw
                .deployments
                .into_iter()
                .map(|d| ServiceDeployment {
                    id: DeploymentId::new(d.id),
                    status: d.status,
                    task_definition: d.task_definition,
                    desired_count: d.desired_count,
                    running_count: d.running_count,
                })
                .collect(),
            events: raw
                .events
                .into_iter()
                .map(|e| ServiceEvent {
                    id: e.id,
                    created_at: e.created_at,
                    message: e.message,
                })
                .collect(),
        }
    }
}

impl RawLoadBalancer {
    fn into_binding(self) -> Option<LoadBalancerBinding> {
        let target = match (self.load_balancer_name, self.target_group_arn) {
            (_, Some(arn)) => LoadBalancerTarget::TargetGroup(TargetGroupArn::new(arn)),
            (Some(name), None) => LoadBalancerTarget::Classic(name),
            (None, None) => return None,
        };
        Some(LoadBalancerBinding {
            target,
            container_name: self.container_name,
            container_port: self.container_port,
        })
    }
}

impl From<RawTask> for TaskInfo {
    fn from(raw: RawTask) -> Self {
        TaskInfo {
            arn: raw.task_arn,
            last_status: TaskStatus::parse(&raw.last_status),
            started_by: raw.started_by,
            containers: raw
                .containers
                .into_iter()
                .map(|c| TaskContainer {
                    name: c.name,
                    last_status: c.last_status,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTaskDefinition {
    pub task_definition: RawTaskDefinition,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTaskDefinition {
    pub task_definition_arn: TaskDefinitionArn,
    pub family: String,
    pub revision: u32,
}

impl From<RawTaskDefinition> for RegisteredTaskDefinition {
    fn from(raw: RawTaskDefinition) -> Self {
        RegisteredTaskDefinition {
            arn: raw.task_definition_arn,
            family: raw.family,
            revision: raw.revision,
        }
    }
}

// =============================================================================
// Auto Scaling
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeAutoScalingGroups {
    #[serde(default)]
    pub auto_scaling_groups: Vec<RawAutoScalingGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawAutoScalingGroup {
    pub auto_scaling_group_name: String,
    #[serde(default)]
    pub load_balancer_names: Vec<String>,
    #[serde(default, rename = "TargetGroupARNs")]
    pub target_group_arns: Vec<TargetGroupArn>,
}

impl From<RawAutoScalingGroup> for AutoScalingGroup {
    fn from(raw: RawAutoScalingGroup) -> Self {
        AutoScalingGroup {
            name: raw.auto_scaling_group_name,
            load_balancer_names: raw.load_balancer_names,
            target_group_arns: raw.target_group_arns,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeLoadBalancers {
    #[serde(default)]
    pub load_balancers: Vec<RawLoadBalancerState>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawLoadBalancerState {
    pub load_balancer_name: String,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeLoadBalancerTargetGroups {
    #[serde(default)]
    pub load_balancer_target_groups: Vec<RawTargetGroupState>,
}

#[derive(Debug, Deserialize)]
pub struct RawTargetGroupState {
    #[serde(rename = "LoadBalancerTargetGroupARN")]
    pub arn: TargetGroupArn,
    #[serde(rename = "State", default)]
    pub state: String,
}

impl From<RawTargetGroupState> for TargetGroupAttachment {
    fn from(raw: RawTargetGroupState) -> Self {
        TargetGroupAttachment {
            arn: raw.arn,
            state: AttachmentState::parse(&raw.state),
        }
    }
}

// =============================================================================
// Application Auto Scaling
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeScalableTargets {
    #[serde(default)]
    pub scalable_targets: Vec<RawScalableTarget>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawScalableTarget {
    pub resource_id: String,
    #[serde(default)]
    pub min_capacity: u32,
    #[serde(default)]
    pub max_capacity: u32,
    #[serde(default, rename = "RoleARN")]
    pub role_arn: Option<String>,
}

impl From<RawScalableTarget> for ScalableTarget {
    fn from(raw: RawScalableTarget) -> Self {
        ScalableTarget {
            resource_id: raw.resource_id,
            min_capacity: raw.min_capacity,
            max_capacity: raw.max_capacity,
            role_arn: raw.role_arn,
        }
    }
}

// =============================================================================
// ELBv2
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeTargetGroups {
    #[serde(default)]
    pub target_groups: Vec<RawTargetGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawTargetGroup {
    pub target_group_arn: TargetGroupArn,
    pub target_group_name: String,
}
