// ABOUTME: Desired ECS service definitions loaded from service/<cluster>.yml.
// ABOUTME: Each file is a map of service name to service body.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aws::shared_types::{
    DeploymentConfiguration, LoadBalancerBinding, PlacementConstraint, PlacementStrategy,
};
use crate::types::ResourceName;

/// Every service declared for one cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesiredCluster {
    pub name: String,
    pub services: BTreeMap<ResourceName, DesiredService>,
}

/// The declared state of one ECS service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesiredService {
    pub name: ResourceName,
    pub task_definition: String,
    pub desired_count: u32,
    /// Keep whatever count is live on update (autoscaling owns it).
    pub keep_desired_count: bool,
    pub load_balancers: Vec<LoadBalancerBinding>,
    pub role: Option<String>,
    pub minimum_healthy_percent: Option<u32>,
    pub maximum_percent: Option<u32>,
    pub autoscaling: Option<AutoScalingTarget>,
    pub placement_constraints: Vec<PlacementConstraint>,
    pub placement_strategy: Vec<PlacementStrategy>,
}

/// Application Auto Scaling bounds for a service's desired count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoScalingTarget {
    pub min_capacity: u32,
    pub max_capacity: u32,
    pub role: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct ServiceBody {
    task_definition: String,
    #[serde(default)]
    desired_count: u32,
    #[serde(default)]
    keep_desired_count: bool,
    #[serde(default)]
    load_balancers: Vec<LoadBalancerBinding>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    minimum_healthy_percent: Option<u32>,
    #[serde(default)]
    maximum_percent: Option<u32>,
    #[serde(default)]
    autoscaling: Option<AutoScalingTarget>,
    #[serde(default)]
    placement_constraints: Vec<PlacementConstraint>,
    #[serde(default)]
    placement_strategy: Vec<PlacementStrategy>,
}

impl DesiredService {
    pub(super) fn from_body(name: ResourceName, body: ServiceBody) -> Self {
        DesiredService {
            name,
            task_definition: body.task_definition,
            desired_count: body.desired_count,
            keep_desired_count: body.keep_desired_count,
            load_balancers: body.load_balancers,
            role: body.role,
            minimum_healthy_percent: body.minimum_healthy_percent,
            maximum_percent: body.maximum_percent,
            autoscaling: body.autoscaling,
            placement_constraints: body.placement_constraints,
            placement_strategy: body.placement_strategy,
        }
    }

    /// Only sent to ECS when both percentages are declared.
    pub fn deployment_configuration(&self) -> Option<DeploymentConfiguration> {
        match (self.minimum_healthy_percent, self.maximum_percent) {
            (Some(minimum_healthy_percent), Some(maximum_percent)) => {
                Some(DeploymentConfiguration {
                    minimum_healthy_percent,
                    maximum_percent,
                })
            }
            _ => None,
        }
    }

    /// Count to request on update given what is live right now.
    pub fn next_desired_count(&self, live_desired_count: u32) -> u32 {
        if self.keep_desired_count {
            live_desired_count
        } else {
            self.desired_count
        }
    }
}

impl DesiredCluster {
    /// Parse a cluster file's contents. An empty file declares no services.
    pub fn from_yaml(name: &str, yaml: &str) -> Result<Self, ServiceParseError> {
        let bodies: Option<BTreeMap<String, ServiceBody>> =
            serde_yaml::from_str(yaml).map_err(ServiceParseError::Yaml)?;

        let mut services = BTreeMap::new();
        for (service_name, body) in bodies.unwrap_or_default() {
            let key = ResourceName::new(&service_name).map_err(|e| ServiceParseError::Name {
                name: service_name.clone(),
                reason: e.to_string(),
            })?;
            services.insert(key.clone(), DesiredService::from_body(key, body));
        }

        Ok(DesiredCluster {
            name: name.to_string(),
            services,
        })
    }

    /// Keep only the named service, if it is declared.
    pub fn retain_service(&mut self, service: &str) {
        self.services.retain(|name, _| name.as_str() == service);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceParseError {
    #[error("{0}")]
    Yaml(serde_yaml::Error),

    #[error("invalid service name '{name}': {reason}")]
    Name { name: String, reason: String },
}
