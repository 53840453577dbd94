// ABOUTME: Builds blue-green plans from definitions, live ECS services and autoscaling groups.
// ABOUTME: Both sides must resolve or construction fails naming the first missing resource.

use std::collections::BTreeMap;

use crate::aws::shared_types::LiveService;
use crate::aws::{AutoScalingOps, EcsOps};
use crate::config::{BlueGreenDef, BlueGreenTarget};
use crate::plan::ServiceUpdatePlan;

use super::error::SwitchError;
use super::plan::{BlueGreenPlan, ServiceSet, Side, SwitchMode};

pub struct BlueGreenPlanBuilder<'a, A> {
    api: &'a A,
}

impl<'a, A: EcsOps + AutoScalingOps> BlueGreenPlanBuilder<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Plans for every definition, in name order.
    pub async fn build_blue_green_plans(
        &self,
        defs: &BTreeMap<String, BlueGreenDef>,
        cluster_plans: &[ServiceUpdatePlan],
    ) -> Result<Vec<BlueGreenPlan>, SwitchError> {
        let mut plans = Vec::with_capacity(defs.len());
        for (name, def) in defs {
            plans.push(self.build_blue_green_plan(name, def, cluster_plans).await?);
        }
        Ok(plans)
    }

    pub async fn build_blue_green_plan(
        &self,
        name: &str,
        def: &BlueGreenDef,
        cluster_plans: &[ServiceUpdatePlan],
    ) -> Result<BlueGreenPlan, SwitchError> {
        let blue_service = self.describe_service(&def.blue).await?;
        let green_service = self.describe_service(&def.green).await?;

        let mut groups = self
            .api
            .describe_auto_scaling_groups(&[
                def.blue.autoscaling_group.clone(),
                def.green.autoscaling_group.clone(),
            ])
            .await?;

        let blue_service = blue_service.ok_or_else(|| missing_service(Side::Blue, &def.blue))?;
        let green_service = green_service.ok_or_else(|| missing_service(Side::Green, &def.green))?;

        let blue_group = groups.get(&def.blue.autoscaling_group).cloned().ok_or_else(|| {
            SwitchError::AutoScalingGroupNotFound {
                side: Side::Blue,
                group: def.blue.autoscaling_group.clone(),
            }
        })?;
        let green_group = groups.remove(&def.green.autoscaling_group).ok_or_else(|| {
            SwitchError::AutoScalingGroupNotFound {
                side: Side::Green,
                group: def.green.autoscaling_group.clone(),
            }
        })?;

        let blue_plan = find_cluster_plan(cluster_plans, Side::Blue, &def.blue)?;
        let green_plan = find_cluster_plan(cluster_plans, Side::Green, &def.green)?;

        let mode = match def.target_group_pairs() {
            Some(pairs) => SwitchMode::TargetGroups(pairs),
            None => SwitchMode::Classic {
                primary: def.primary_elb.clone(),
                standby: def.standby_elb.clone(),
                chain: def.chain_elb.clone(),
            },
        };

        let plan = BlueGreenPlan {
            name: name.to_string(),
            blue: ServiceSet {
                target: def.blue.clone(),
                service: blue_service,
                group: blue_group,
                cluster_plan: blue_plan.clone(),
            },
            green: ServiceSet {
                target: def.green.clone(),
                service: green_service,
                group: green_group,
                cluster_plan: green_plan.clone(),
            },
            mode,
        };

        tracing::info!(
            bluegreen = name,
            current = %plan.current_side(),
            "built blue-green plan"
        );
        Ok(plan)
    }

    async fn describe_service(&self, target: &BlueGreenTarget) -> Result<Option<LiveService>, SwitchError> {
        let mut services = self
            .api
            .describe_services(&target.cluster, &[target.service.clone()])
            .await?;
        Ok(services.pop())
    }
}

fn missing_service(side: Side, target: &BlueGreenTarget) -> SwitchError {
    SwitchError::ServiceNotFound {
        side,
        cluster: target.cluster.clone(),
        service: target.service.clone(),
    }
}

fn find_cluster_plan<'p>(
    plans: &'p [ServiceUpdatePlan],
    side: Side,
    target: &BlueGreenTarget,
) -> Result<&'p ServiceUpdatePlan, SwitchError> {
    plans
        .iter()
        .find(|p| p.cluster == target.cluster)
        .ok_or_else(|| SwitchError::ClusterPlanNotFound {
            side,
            cluster: target.cluster.clone(),
        })
}
