// ABOUTME: The service update plan for one cluster: live services paired with desired ones.
// ABOUTME: Classification into delete/create/update is derived, never stored.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::aws::shared_types::{LiveService, ScalableTarget};
use crate::config::DesiredService;
use crate::types::{ContainerInstanceArn, ResourceName};

/// A live ECS service and its Application Auto Scaling target, if any.
#[derive(Debug, Clone, Serialize)]
pub struct LiveServiceStack {
    pub service: LiveService,
    pub autoscaling: Option<ScalableTarget>,
}

/// Everything needed to reconcile one cluster.
///
/// Only built for ACTIVE clusters with at least one container instance.
/// Current and desired services are paired purely by name.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceUpdatePlan {
    pub cluster: String,
    pub instance_arns: Vec<ContainerInstanceArn>,
    pub current: BTreeMap<String, LiveServiceStack>,
    pub desired: BTreeMap<ResourceName, DesiredService>,
}

impl ServiceUpdatePlan {
    /// Live services with no desired counterpart.
    pub fn to_delete(&self) -> impl Iterator<Item = &LiveServiceStack> {
        self.current
            .iter()
            .filter(move |(name, _)| !self.desired.contains_key(name.as_str()))
            .map(|(_, stack)| stack)
    }

    /// Desired services that do not exist yet.
    pub fn to_create(&self) -> impl Iterator<Item = &DesiredService> {
        self.desired
            .values()
            .filter(move |desired| !self.current.contains_key(desired.name.as_str()))
    }

    /// Desired services paired with their live counterpart.
    pub fn to_update(&self) -> impl Iterator<Item = (&LiveServiceStack, &DesiredService)> {
        self.desired.values().filter_map(move |desired| {
            self.current
                .get(desired.name.as_str())
                .map(|live| (live, desired))
        })
    }

    /// No service needs to be created or deleted.
    pub fn is_settled(&self) -> bool {
        self.to_delete().next().is_none() && self.to_create().next().is_none()
    }

    pub fn current_service(&self, name: &str) -> Option<&LiveServiceStack> {
        self.current.get(name)
    }
}
