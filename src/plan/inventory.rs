// ABOUTME: Reads desired clusters and live ECS state into service update plans.
// ABOUTME: Read-only: nothing here mutates AWS.

use crate::aws::{AppAutoScalingOps, EcsOps};
use crate::config::DesiredCluster;
use crate::diagnostics::{Diagnostics, Warning};

use super::error::PlanError;
use super::plan::{LiveServiceStack, ServiceUpdatePlan};

/// Builds [`ServiceUpdatePlan`]s from live ECS state.
pub struct Inventory<'a, A> {
    api: &'a A,
    service_filter: Option<String>,
}

impl<'a, A: EcsOps + AppAutoScalingOps> Inventory<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            service_filter: None,
        }
    }

    /// Restrict both live and desired services to one name.
    pub fn with_service_filter(mut self, service: Option<String>) -> Self {
        self.service_filter = service;
        self
    }

    /// One plan per usable cluster, in input order. Clusters without
    /// container instances are skipped with a warning.
    pub async fn build_service_update_plans(
        &self,
        clusters: &[DesiredCluster],
        diag: &mut Diagnostics,
    ) -> Result<Vec<ServiceUpdatePlan>, PlanError> {
        let mut plans = Vec::with_capacity(clusters.len());
        for cluster in clusters {
            if let Some(plan) = self.build_service_update_plan(cluster, diag).await? {
                plans.push(plan);
            }
        }
        Ok(plans)
    }

    pub async fn build_service_update_plan(
        &self,
        desired: &DesiredCluster,
        diag: &mut Diagnostics,
    ) -> Result<Option<ServiceUpdatePlan>, PlanError> {
        let cluster = desired.name.as_str();

        let info = self
            .api
            .describe_cluster(cluster)
            .await?
            .ok_or_else(|| PlanError::ClusterNotFound(cluster.to_string()))?;
        if !info.is_active() {
            return Err(PlanError::ClusterNotActive(cluster.to_string()));
        }

        let instance_arns = self.api.list_container_instances(cluster).await?;
        if instance_arns.is_empty() {
            diag.warn(Warning::empty_cluster(cluster));
            return Ok(None);
        }

        let service_arns: Vec<String> = self
            .api
            .list_services(cluster)
            .await?
            .into_iter()
            .map(|arn| arn.into_inner())
            .collect();

        let mut current = std::collections::BTreeMap::new();
        if !service_arns.is_empty() {
            for service in self.api.describe_services(cluster, &service_arns).await? {
                if !self.selected(&service.name) {
                    continue;
                }
                let autoscaling = self
                    .api
                    .describe_scalable_target(cluster, &service.name)
                    .await?;
                current.insert(
                    service.name.clone(),
                    LiveServiceStack {
                        service,
                        autoscaling,
                    },
                );
            }
        }

        let mut wanted = desired.clone();
        if let Some(filter) = &self.service_filter {
            wanted.retain_service(filter);
        }

        tracing::info!(
            cluster,
            instances = instance_arns.len(),
            current = current.len(),
            desired = wanted.services.len(),
            "built service update plan"
        );

        Ok(Some(ServiceUpdatePlan {
            cluster: cluster.to_string(),
            instance_arns,
            current,
            desired: wanted.services,
        }))
    }

    fn selected(&self, service: &str) -> bool {
        self.service_filter
            .as_deref()
            .is_none_or(|wanted| wanted == service)
    }
}
