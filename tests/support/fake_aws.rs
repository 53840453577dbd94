// ABOUTME: In-memory AWS fake implementing every capability trait.
// ABOUTME: Tasks, service drains and LB attachments advance through scripted states on describe.

use std::collections::{BTreeMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;

use ecs_cutover::aws::shared_types::{
    AttachmentState, AutoScalingGroup, ClusterInfo, CreateServiceRequest, LiveService,
    RegisterTaskDefinitionRequest, RegisteredTaskDefinition, ScalableTarget, ScalableTargetRequest, ServiceDeployment, ServiceEvent, ServiceStatus,
    TargetGroupAttachment, TaskInfo, TaskStatus, UpdateServiceRequest, service_resource_id,
};
use ecs_cutover::aws::{AppAutoScalingOps, ApiError, AutoScalingOps, EcsOps, ElbV2Ops};
use ecs_cutover::types::{
    ContainerInstanceArn, DeploymentId, ServiceArn, TargetGroupArn, TaskArn, TaskDefinitionArn,
};
use serde_json::Value;

pub const ACCOUNT: &str = "123456789012";

pub fn target_group_arn(name: &str) -> TargetGroupArn {
    TargetGroupArn::new(format!(
        "arn:aws:elasticloadbalancing:us-east-1:{ACCOUNT}:targetgroup/{name}/0123456789abcdef"
    ))
}

struct FakeTask {
    cluster: String,
    service: String,
    started_by: String,
    status: TaskStatus,
    script: VecDeque<TaskStatus>,
}

#[derive(Default)]
struct FakeGroup {
    load_balancers: BTreeMap<String, AttachmentState>,
    target_groups: BTreeMap<TargetGroupArn, AttachmentState>,
}

#[derive(Default)]
struct State {
    clusters: BTreeMap<String, (String, Vec<ContainerInstanceArn>)>,
    services: BTreeMap<(String, String), LiveService>,
    tasks: BTreeMap<TaskArn, FakeTask>,
    groups: BTreeMap<String, FakeGroup>,
    target_groups: BTreeMap<String, TargetGroupArn>,
    scalable_targets: BTreeMap<String, ScalableTarget>,
    calls: Vec<String>,
    throttle_remaining: u32,
    task_script: Vec<TaskStatus>,
    placement_failure: Option<String>,
    fail_stop_task: bool,
    drain_script: Vec<(u32, ServiceStatus)>,
    drains: BTreeMap<(String, String), VecDeque<(u32, ServiceStatus)>>,
    delete_lag: u32,
    deleting: BTreeMap<(String, String), u32>,
    task_definitions: BTreeMap<String, Vec<Vec<Value>>>,
    serial: u32,
}

impl State {
    fn next_serial(&mut self) -> u32 {
        self.serial += 1;
        self.serial
    }

    /// Record the call and fail it if a throttle is pending.
    fn enter(&mut self, operation: &str) -> Result<(), ApiError> {
        self.calls.push(operation.to_string());
        if self.throttle_remaining > 0 {
            self.throttle_remaining -= 1;
            return Err(ApiError::call(
                operation,
                "An error occurred (ThrottlingException): Rate exceeded",
            ));
        }
        Ok(())
    }

    fn new_deployment(&mut self) -> DeploymentId {
        DeploymentId::new(format!("ecs-svc/{}", self.next_serial()))
    }

    fn spawn_tasks(&mut self, cluster: &str, service: &str, deployment: &DeploymentId, count: u32, script: Vec<TaskStatus>) {
        for _ in 0..count {
            let arn = TaskArn::new(format!(
                "arn:aws:ecs:us-east-1:{ACCOUNT}:task/{cluster}/{:04}",
                self.next_serial()
            ));
            self.tasks.insert(
                arn,
                FakeTask {
                    cluster: cluster.to_string(),
                    service: service.to_string(),
                    started_by: deployment.to_string(),
                    status: if script.is_empty() {
                        TaskStatus::Running
                    } else {
                        TaskStatus::Provisioning
                    },
                    script: script.iter().cloned().collect(),
                },
            );
        }
    }

    fn stop_service_tasks(&mut self, cluster: &str, service: &str) {
        for task in self.tasks.values_mut() {
            if task.cluster == cluster && task.service == service {
                task.status = TaskStatus::Stopped;
                task.script.clear();
            }
        }
    }
}

pub struct FakeAws {
    state: Mutex<State>,
}

impl Default for FakeAws {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl FakeAws {
    pub fn new() -> Self {
        let state = State {
            task_script: vec![TaskStatus::Pending, TaskStatus::Running],
            ..State::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn with_cluster(self, name: &str, instances: usize) -> Self {
        self.with_cluster_status(name, "ACTIVE", instances)
    }

    pub fn with_cluster_status(self, name: &str, status: &str, instances: usize) -> Self {
        {
            let mut s = self.state.lock();
            let arns = (0..instances)
                .map(|i| {
                    ContainerInstanceArn::new(format!(
                        "arn:aws:ecs:us-east-1:{ACCOUNT}:container-instance/{name}/{i}"
                    ))
                })
                .collect();
            s.clusters.insert(name.to_string(), (status.to_string(), arns));
        }
        self
    }

    /// A running service with `desired_count` RUNNING tasks from one deployment.
    pub fn with_service(self, cluster: &str, name: &str, task_definition: &str, desired_count: u32) -> Self {
        {
            let mut s = self.state.lock();
            let deployment = s.new_deployment();
            s.spawn_tasks(cluster, name, &deployment, desired_count, vec![]);
            let service = LiveService {
                name: name.to_string(),
                arn: ServiceArn::new(format!(
                    "arn:aws:ecs:us-east-1:{ACCOUNT}:service/{cluster}/{name}"
                )),
                status: ServiceStatus::Active,
                task_definition: task_definition.to_string(),
                desired_count,
                running_count: desired_count,
                pending_count: 0,
                load_balancers: vec![],
                deployments: vec![ServiceDeployment {
                    id: deployment,
                    status: "PRIMARY".to_string(),
                    task_definition: task_definition.to_string(),
                    desired_count,
                    running_count: desired_count,
                }],
                events: vec![],
            };
            s.services.insert((cluster.to_string(), name.to_string()), service);
        }
        self
    }

    pub fn with_scalable_target(self, cluster: &str, service: &str, min: u32, max: u32) -> Self {
        {
            let resource_id = service_resource_id(cluster, service);
            self.state.lock().scalable_targets.insert(
                resource_id.clone(),
                ScalableTarget {
                    resource_id,
                    min_capacity: min,
                    max_capacity: max,
                    role_arn: None,
                },
            );
        }
        self
    }

    /// An autoscaling group already serving on the given load balancers and target groups.
    pub fn with_group(self, name: &str, load_balancers: &[&str], target_groups: &[&str]) -> Self {
        {
            let mut group = FakeGroup::default();
            for lb in load_balancers {
                group.load_balancers.insert(lb.to_string(), AttachmentState::InService);
            }
            for tg in target_groups {
                group
                    .target_groups
                    .insert(target_group_arn(tg), AttachmentState::InService);
            }
            self.state.lock().groups.insert(name.to_string(), group);
        }
        self
    }

    pub fn with_target_groups(self, names: &[&str]) -> Self {
        {
            let mut s = self.state.lock();
            for name in names {
                s.target_groups.insert(name.to_string(), target_group_arn(name));
            }
        }
        self
    }

    /// Statuses each new task reports on successive describes.
    pub fn with_task_script(self, script: &[TaskStatus]) -> Self {
        self.state.lock().task_script = script.to_vec();
        self
    }

    /// Every created service gets this event as its newest.
    pub fn with_placement_failure(self, message: &str) -> Self {
        self.state.lock().placement_failure = Some(message.to_string());
        self
    }

    /// Running count and status a service reports on successive describes
    /// after it is scaled to zero. The last frame repeats.
    pub fn with_drain(self, frames: &[(u32, ServiceStatus)]) -> Self {
        self.state.lock().drain_script = frames.to_vec();
        self
    }

    /// Deleted services stay DRAINING for `describes` describes before
    /// their record disappears.
    pub fn with_delete_lag(self, describes: u32) -> Self {
        self.state.lock().delete_lag = describes;
        self
    }

    pub fn failing_stop_task(self) -> Self {
        self.state.lock().fail_stop_task = true;
        self
    }

    /// The next `n` calls fail with a throttling error.
    pub fn throttle_next(&self, n: u32) {
        self.state.lock().throttle_remaining = n;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn count_calls(&self, operation: &str) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.as_str() == operation)
            .count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn service(&self, cluster: &str, name: &str) -> Option<LiveService> {
        self.state
            .lock()
            .services
            .get(&(cluster.to_string(), name.to_string()))
            .cloned()
    }

    pub fn scalable_target(&self, cluster: &str, service: &str) -> Option<ScalableTarget> {
        self.state
            .lock()
            .scalable_targets
            .get(&service_resource_id(cluster, service))
            .cloned()
    }

    /// Task ARNs of a service that are not STOPPED.
    pub fn live_tasks(&self, cluster: &str, service: &str) -> Vec<TaskArn> {
        self.state
            .lock()
            .tasks
            .iter()
            .filter(|(_, t)| t.cluster == cluster && t.service == service && t.status != TaskStatus::Stopped)
            .map(|(arn, _)| arn.clone())
            .collect()
    }

    /// Container definitions of every registered revision of `family`, oldest first.
    pub fn task_definition_revisions(&self, family: &str) -> Vec<Vec<Value>> {
        self.state
            .lock()
            .task_definitions
            .get(family)
            .cloned()
            .unwrap_or_default()
    }

    /// Groups currently attached to a classic load balancer.
    pub fn groups_on_load_balancer(&self, lb: &str) -> Vec<String> {
        self.state
            .lock()
            .groups
            .iter()
            .filter(|(_, g)| g.load_balancers.contains_key(lb))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Groups currently attached to a target group, by name.
    pub fn groups_on_target_group(&self, name: &str) -> Vec<String> {
        let arn = target_group_arn(name);
        self.state
            .lock()
            .groups
            .iter()
            .filter(|(_, g)| g.target_groups.contains_key(&arn))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[async_trait]
impl EcsOps for FakeAws {
    async fn describe_cluster(&self, cluster: &str) -> Result<Option<ClusterInfo>, ApiError> {
        let mut s = self.state.lock();
        s.enter("ecs:DescribeClusters")?;
        Ok(s.clusters.get(cluster).map(|(status, _)| ClusterInfo {
            name: cluster.to_string(),
            status: status.clone(),
        }))
    }

    async fn list_container_instances(&self, cluster: &str) -> Result<Vec<ContainerInstanceArn>, ApiError> {
        let mut s = self.state.lock();
        s.enter("ecs:ListContainerInstances")?;
        Ok(s.clusters
            .get(cluster)
            .map(|(_, arns)| arns.clone())
            .unwrap_or_default())
    }

    async fn list_services(&self, cluster: &str) -> Result<Vec<ServiceArn>, ApiError> {
        let mut s = self.state.lock();
        s.enter("ecs:ListServices")?;
        Ok(s.services
            .iter()
            .filter(|((c, _), _)| c == cluster)
            .map(|(_, svc)| svc.arn.clone())
            .collect())
    }

    async fn describe_services(&self, cluster: &str, services: &[String]) -> Result<Vec<LiveService>, ApiError> {
        let mut guard = self.state.lock();
        guard.enter("ecs:DescribeServices")?;
        let s = &mut *guard;

        let mut found = Vec::new();
        for wanted in services {
            let Some(key) = s
                .services
                .iter()
                .find(|((c, name), svc)| c == cluster && (name == wanted || svc.arn.as_str() == wanted))
                .map(|(key, _)| key.clone())
            else {
                continue;
            };

            if let Some(remaining) = s.deleting.get_mut(&key) {
                if *remaining == 0 {
                    s.deleting.remove(&key);
                    s.services.remove(&key);
                    continue;
                }
                *remaining -= 1;
            }

            let frame = s.drains.get_mut(&key).and_then(|frames| {
                if frames.len() > 1 {
                    frames.pop_front()
                } else {
                    frames.front().cloned()
                }
            });
            let Some(service) = s.services.get_mut(&key) else {
                continue;
            };
            if let Some((running, status)) = frame {
                service.running_count = running;
                service.status = status;
            }
            found.push(service.clone());
        }
        Ok(found)
    }

    async fn create_service(&self, request: &CreateServiceRequest) -> Result<LiveService, ApiError> {
        let mut s = self.state.lock();
        s.enter("ecs:CreateService")?;

        let deployment = s.new_deployment();
        let script = s.task_script.clone();
        s.spawn_tasks(&request.cluster, &request.service, &deployment, request.desired_count, script);

        let events = s
            .placement_failure
            .clone()
            .map(|message| {
                vec![ServiceEvent {
                    id: "event-1".to_string(),
                    created_at: None,
                    message,
                }]
            })
            .unwrap_or_default();

        let service = LiveService {
            name: request.service.clone(),
            arn: ServiceArn::new(format!(
                "arn:aws:ecs:us-east-1:{ACCOUNT}:service/{}/{}",
                request.cluster, request.service
            )),
            status: ServiceStatus::Active,
            task_definition: request.task_definition.clone(),
            desired_count: request.desired_count,
            running_count: 0,
            pending_count: request.desired_count,
            load_balancers: request.load_balancers.clone(),
            deployments: vec![ServiceDeployment {
                id: deployment,
                status: "PRIMARY".to_string(),
                task_definition: request.task_definition.clone(),
                desired_count: request.desired_count,
                running_count: 0,
            }],
            events,
        };
        s.services.insert(
            (request.cluster.clone(), request.service.clone()),
            service.clone(),
        );
        Ok(service)
    }

    async fn update_service(&self, request: &UpdateServiceRequest) -> Result<LiveService, ApiError> {
        let mut s = self.state.lock();
        s.enter("ecs:UpdateService")?;

        let key = (request.cluster.clone(), request.service.clone());
        let Some(mut service) = s.services.get(&key).cloned() else {
            return Err(ApiError::call("ecs:UpdateService", "ServiceNotFoundException"));
        };

        if request.desired_count == 0 {
            s.stop_service_tasks(&request.cluster, &request.service);
            service.desired_count = 0;
            if s.drain_script.is_empty() {
                service.running_count = 0;
            } else {
                let frames = s.drain_script.iter().cloned().collect();
                s.drains.insert(key.clone(), frames);
            }
        } else {
            let deployment = s.new_deployment();
            let script = s.task_script.clone();
            s.spawn_tasks(&request.cluster, &request.service, &deployment, request.desired_count, script);
            for d in &mut service.deployments {
                if d.status == "PRIMARY" {
                    d.status = "ACTIVE".to_string();
                }
            }
            service.deployments.insert(
                0,
                ServiceDeployment {
                    id: deployment,
                    status: "PRIMARY".to_string(),
                    task_definition: request.task_definition.clone(),
                    desired_count: request.desired_count,
                    running_count: 0,
                },
            );
            service.desired_count = request.desired_count;
            service.task_definition = request.task_definition.clone();
        }

        s.services.insert(key, service.clone());
        Ok(service)
    }

    async fn delete_service(&self, cluster: &str, service: &str) -> Result<LiveService, ApiError> {
        let mut s = self.state.lock();
        s.enter("ecs:DeleteService")?;
        let key = (cluster.to_string(), service.to_string());
        s.drains.remove(&key);

        if s.delete_lag == 0 {
            let mut removed = s
                .services
                .remove(&key)
                .ok_or_else(|| ApiError::call("ecs:DeleteService", "ServiceNotFoundException"))?;
            removed.status = ServiceStatus::Draining;
            return Ok(removed);
        }

        let lag = s.delete_lag;
        let Some(record) = s.services.get_mut(&key) else {
            return Err(ApiError::call("ecs:DeleteService", "ServiceNotFoundException"));
        };
        record.status = ServiceStatus::Draining;
        let deleted = record.clone();
        s.deleting.insert(key, lag);
        Ok(deleted)
    }

    async fn list_tasks(&self, cluster: &str, service: &str) -> Result<Vec<TaskArn>, ApiError> {
        let mut s = self.state.lock();
        s.enter("ecs:ListTasks")?;
        Ok(s.tasks
            .iter()
            .filter(|(_, t)| t.cluster == cluster && t.service == service && t.status != TaskStatus::Stopped)
            .map(|(arn, _)| arn.clone())
            .collect())
    }

    async fn describe_tasks(&self, _cluster: &str, tasks: &[TaskArn]) -> Result<Vec<TaskInfo>, ApiError> {
        let mut s = self.state.lock();
        s.enter("ecs:DescribeTasks")?;
        Ok(tasks
            .iter()
            .filter_map(|arn| {
                let task = s.tasks.get_mut(arn)?;
                if let Some(next) = task.script.pop_front() {
                    task.status = next;
                }
                Some(TaskInfo {
                    arn: arn.clone(),
                    last_status: task.status.clone(),
                    started_by: Some(task.started_by.clone()),
                    containers: vec![],
                })
            })
            .collect())
    }

    async fn stop_task(&self, _cluster: &str, task: &TaskArn) -> Result<(), ApiError> {
        let mut s = self.state.lock();
        s.enter("ecs:StopTask")?;
        if s.fail_stop_task {
            return Err(ApiError::call("ecs:StopTask", "InvalidParameterException: task not found"));
        }
        if let Some(t) = s.tasks.get_mut(task) {
            t.status = TaskStatus::Stopped;
            t.script.clear();
        }
        Ok(())
    }

    async fn register_task_definition(
        &self,
        request: &RegisterTaskDefinitionRequest,
    ) -> Result<RegisteredTaskDefinition, ApiError> {
        let mut s = self.state.lock();
        s.enter("ecs:RegisterTaskDefinition")?;
        let revisions = s.task_definitions.entry(request.family.clone()).or_default();
        revisions.push(request.container_definitions.clone());
        let revision = revisions.len() as u32;
        Ok(RegisteredTaskDefinition {
            arn: TaskDefinitionArn::new(format!(
                "arn:aws:ecs:us-east-1:{ACCOUNT}:task-definition/{}:{revision}",
                request.family
            )),
            family: request.family.clone(),
            revision,
        })
    }
}

#[async_trait]
impl AutoScalingOps for FakeAws {
    async fn describe_auto_scaling_groups(&self, names: &[String]) -> Result<BTreeMap<String, AutoScalingGroup>, ApiError> {
        let mut s = self.state.lock();
        s.enter("autoscaling:DescribeAutoScalingGroups")?;
        Ok(names
            .iter()
            .filter_map(|name| {
                s.groups.get(name).map(|g| {
                    (
                        name.clone(),
                        AutoScalingGroup {
                            name: name.clone(),
                            load_balancer_names: g.load_balancers.keys().cloned().collect(),
                            target_group_arns: g.target_groups.keys().cloned().collect(),
                        },
                    )
                })
            })
            .collect())
    }

    async fn describe_load_balancer_state(&self, group: &str) -> Result<BTreeMap<String, AttachmentState>, ApiError> {
        let mut s = self.state.lock();
        s.enter("autoscaling:DescribeLoadBalancers")?;
        let Some(g) = s.groups.get_mut(group) else {
            return Ok(BTreeMap::new());
        };
        let observed = g.load_balancers.clone();
        for state in g.load_balancers.values_mut() {
            if *state == AttachmentState::Adding {
                *state = AttachmentState::InService;
            }
        }
        Ok(observed)
    }

    async fn describe_load_balancer_target_groups(&self, group: &str) -> Result<Vec<TargetGroupAttachment>, ApiError> {
        let mut s = self.state.lock();
        s.enter("autoscaling:DescribeLoadBalancerTargetGroups")?;
        let Some(g) = s.groups.get_mut(group) else {
            return Ok(vec![]);
        };
        let observed = g
            .target_groups
            .iter()
            .map(|(arn, state)| TargetGroupAttachment {
                arn: arn.clone(),
                state: state.clone(),
            })
            .collect();
        for state in g.target_groups.values_mut() {
            if *state == AttachmentState::Adding {
                *state = AttachmentState::InService;
            }
        }
        Ok(observed)
    }

    async fn attach_load_balancers(&self, group: &str, names: &[String]) -> Result<(), ApiError> {
        let mut s = self.state.lock();
        s.enter("autoscaling:AttachLoadBalancers")?;
        let g = s.groups.entry(group.to_string()).or_default();
        for name in names {
            g.load_balancers.insert(name.clone(), AttachmentState::Adding);
        }
        Ok(())
    }

    async fn detach_load_balancers(&self, group: &str, names: &[String]) -> Result<(), ApiError> {
        let mut s = self.state.lock();
        s.enter("autoscaling:DetachLoadBalancers")?;
        if let Some(g) = s.groups.get_mut(group) {
            for name in names {
                g.load_balancers.remove(name);
            }
        }
        Ok(())
    }

    async fn attach_load_balancer_target_groups(&self, group: &str, arns: &[TargetGroupArn]) -> Result<(), ApiError> {
        let mut s = self.state.lock();
        s.enter("autoscaling:AttachLoadBalancerTargetGroups")?;
        let g = s.groups.entry(group.to_string()).or_default();
        for arn in arns {
            g.target_groups.insert(arn.clone(), AttachmentState::Adding);
        }
        Ok(())
    }

    async fn detach_load_balancer_target_groups(&self, group: &str, arns: &[TargetGroupArn]) -> Result<(), ApiError> {
        let mut s = self.state.lock();
        s.enter("autoscaling:DetachLoadBalancerTargetGroups")?;
        if let Some(g) = s.groups.get_mut(group) {
            for arn in arns {
                g.target_groups.remove(arn);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AppAutoScalingOps for FakeAws {
    async fn describe_scalable_target(&self, cluster: &str, service: &str) -> Result<Option<ScalableTarget>, ApiError> {
        let mut s = self.state.lock();
        s.enter("application-autoscaling:DescribeScalableTargets")?;
        Ok(s.scalable_targets
            .get(&service_resource_id(cluster, service))
            .cloned())
    }

    async fn register_scalable_target(&self, request: &ScalableTargetRequest) -> Result<(), ApiError> {
        let mut s = self.state.lock();
        s.enter("application-autoscaling:RegisterScalableTarget")?;
        let resource_id = service_resource_id(&request.cluster, &request.service);
        s.scalable_targets.insert(
            resource_id.clone(),
            ScalableTarget {
                resource_id,
                min_capacity: request.min_capacity,
                max_capacity: request.max_capacity,
                role_arn: Some(request.role_arn.clone()),
            },
        );
        Ok(())
    }

    async fn deregister_scalable_target(&self, resource_id: &str) -> Result<(), ApiError> {
        let mut s = self.state.lock();
        s.enter("application-autoscaling:DeregisterScalableTarget")?;
        s.scalable_targets.remove(resource_id);
        Ok(())
    }
}

#[async_trait]
impl ElbV2Ops for FakeAws {
    async fn describe_target_groups(&self, names: &[String]) -> Result<BTreeMap<String, TargetGroupArn>, ApiError> {
        let mut s = self.state.lock();
        s.enter("elbv2:DescribeTargetGroups")?;
        Ok(names
            .iter()
            .filter_map(|name| s.target_groups.get(name).map(|arn| (name.clone(), arn.clone())))
            .collect())
    }
}
