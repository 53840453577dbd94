// ABOUTME: Traffic switches for classic ELBs and ALB target groups, and the deployer that runs cutovers.
// ABOUTME: Strategy is chosen from the plan's SwitchMode; both share the same cutover steps.

use std::time::Duration;

use async_trait::async_trait;
use nonempty::NonEmpty;

use crate::aws::{AutoScalingOps, AwsApi, ElbV2Ops};
use crate::config::{PollSettings, TargetGroupPair};
use crate::diagnostics::Diagnostics;
use crate::plan::ServicePlanExecutor;
use crate::poll::PollPolicy;
use crate::types::TargetGroupArn;

use super::cutover::{Cutover, CutoverReport};
use super::error::SwitchError;
use super::plan::{BlueGreenPlan, SwitchMode};

/// Which set of load balancers / target groups an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Primary,
    Standby,
}

/// Attachment operations a cutover needs from a load balancing strategy.
#[async_trait]
pub trait TrafficSwitch: Send + Sync {
    async fn attach(&self, group: &str, tier: Tier) -> Result<(), SwitchError>;

    async fn detach(&self, group: &str, tier: Tier) -> Result<(), SwitchError>;

    /// Poll until `group` is registered with the primary tier.
    async fn wait_primary_ready(&self, group: &str) -> Result<(), SwitchError>;

    /// Pause between primary readiness and detaching the old group.
    fn settle_delay(&self) -> Duration {
        Duration::ZERO
    }
}

// =============================================================================
// Classic ELB
// =============================================================================

/// Switches classic load balancers by name. The chained load balancers move
/// together with the main pair.
pub struct ClassicElbSwitch<'a, A> {
    api: &'a A,
    primary_lb: String,
    primary: Vec<String>,
    standby: Vec<String>,
    poll: PollPolicy,
}

impl<'a, A: AutoScalingOps> ClassicElbSwitch<'a, A> {
    pub fn new(api: &'a A, mode: &SwitchMode, poll: PollPolicy) -> Self {
        let primary = mode.primary_group();
        Self {
            api,
            primary_lb: primary.first().cloned().unwrap_or_default(),
            standby: mode.standby_group(),
            primary,
            poll,
        }
    }

    fn names(&self, tier: Tier) -> &[String] {
        match tier {
            Tier::Primary => &self.primary,
            Tier::Standby => &self.standby,
        }
    }
}

#[async_trait]
impl<'a, A: AutoScalingOps> TrafficSwitch for ClassicElbSwitch<'a, A> {
    async fn attach(&self, group: &str, tier: Tier) -> Result<(), SwitchError> {
        self.api.attach_load_balancers(group, self.names(tier)).await?;
        Ok(())
    }

    async fn detach(&self, group: &str, tier: Tier) -> Result<(), SwitchError> {
        self.api.detach_load_balancers(group, self.names(tier)).await?;
        Ok(())
    }

    async fn wait_primary_ready(&self, group: &str) -> Result<(), SwitchError> {
        let mut ticker = self.poll.ticker();
        while ticker.tick().await {
            let states = self.api.describe_load_balancer_state(group).await?;
            let state = states
                .get(&self.primary_lb)
                .ok_or_else(|| SwitchError::LoadBalancerMissing {
                    group: group.to_string(),
                    load_balancer: self.primary_lb.clone(),
                })?;

            tracing::debug!(group, load_balancer = %self.primary_lb, %state, "load balancer state");
            if state.is_serving() {
                return Ok(());
            }
        }
        Err(SwitchError::ConvergenceTimeout {
            what: format!("'{group}' to join load balancer '{}'", self.primary_lb),
            attempts: ticker.attempts(),
        })
    }
}

// =============================================================================
// ALB target groups
// =============================================================================

/// Switches ALB target groups by ARN. Names are resolved once up front.
pub struct TargetGroupSwitch<'a, A> {
    api: &'a A,
    primary: Vec<TargetGroupArn>,
    standby: Vec<TargetGroupArn>,
    poll: PollPolicy,
    settle: Duration,
}

impl<'a, A: AutoScalingOps + ElbV2Ops> TargetGroupSwitch<'a, A> {
    /// Resolve every primary and standby name. Any name that does not
    /// resolve is an error.
    pub async fn resolve(
        api: &'a A,
        pairs: &NonEmpty<TargetGroupPair>,
        poll: PollPolicy,
        settle: Duration,
    ) -> Result<Self, SwitchError> {
        let names: Vec<String> = pairs
            .iter()
            .flat_map(|p| [p.primary_group.clone(), p.standby_group.clone()])
            .collect();
        let resolved = api.describe_target_groups(&names).await?;

        let lookup = |name: &String| {
            resolved
                .get(name)
                .cloned()
                .ok_or_else(|| SwitchError::UnresolvedTargetGroup(name.clone()))
        };
        let primary = pairs
            .iter()
            .map(|p| lookup(&p.primary_group))
            .collect::<Result<Vec<_>, _>>()?;
        let standby = pairs
            .iter()
            .map(|p| lookup(&p.standby_group))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            api,
            primary,
            standby,
            poll,
            settle,
        })
    }

    fn arns(&self, tier: Tier) -> &[TargetGroupArn] {
        match tier {
            Tier::Primary => &self.primary,
            Tier::Standby => &self.standby,
        }
    }
}

#[async_trait]
impl<'a, A: AutoScalingOps + ElbV2Ops> TrafficSwitch for TargetGroupSwitch<'a, A> {
    async fn attach(&self, group: &str, tier: Tier) -> Result<(), SwitchError> {
        self.api
            .attach_load_balancer_target_groups(group, self.arns(tier))
            .await?;
        Ok(())
    }

    async fn detach(&self, group: &str, tier: Tier) -> Result<(), SwitchError> {
        self.api
            .detach_load_balancer_target_groups(group, self.arns(tier))
            .await?;
        Ok(())
    }

    async fn wait_primary_ready(&self, group: &str) -> Result<(), SwitchError> {
        // `resolve` yields one ARN per pair, and pairs are non-empty.
        let Some(first) = self.primary.first() else {
            return Ok(());
        };

        let mut ticker = self.poll.ticker();
        while ticker.tick().await {
            let attachments = self.api.describe_load_balancer_target_groups(group).await?;
            let attachment = attachments
                .iter()
                .find(|a| &a.arn == first)
                .ok_or_else(|| SwitchError::TargetGroupMissing {
                    group: group.to_string(),
                    target_group: first.to_string(),
                })?;

            tracing::debug!(group, target_group = %first, state = %attachment.state, "target group state");
            if attachment.state.is_serving() {
                return Ok(());
            }
        }
        Err(SwitchError::ConvergenceTimeout {
            what: format!("'{group}' to join target group '{first}'"),
            attempts: ticker.attempts(),
        })
    }

    fn settle_delay(&self) -> Duration {
        self.settle
    }
}

// =============================================================================
// Deployer
// =============================================================================

/// Runs blue-green cutovers, deploying the next side through the service
/// plan executor first unless told not to.
pub struct BlueGreenDeployer<'a, A> {
    api: &'a A,
    poll: &'a PollSettings,
}

impl<'a, A: AwsApi> BlueGreenDeployer<'a, A> {
    pub fn new(api: &'a A, poll: &'a PollSettings) -> Self {
        Self { api, poll }
    }

    /// Apply plans one after another, stopping at the first failure.
    pub async fn apply_blue_green_deploys(
        &self,
        plans: &[BlueGreenPlan],
        nodeploy: bool,
        diag: &mut Diagnostics,
    ) -> Result<Vec<CutoverReport>, SwitchError> {
        let mut reports = Vec::with_capacity(plans.len());
        for plan in plans {
            reports.push(self.apply_blue_green_deploy(plan, nodeploy, diag).await?);
        }
        Ok(reports)
    }

    pub async fn apply_blue_green_deploy(
        &self,
        plan: &BlueGreenPlan,
        nodeploy: bool,
        diag: &mut Diagnostics,
    ) -> Result<CutoverReport, SwitchError> {
        match &plan.mode {
            SwitchMode::Classic { .. } => {
                let switch = ClassicElbSwitch::new(self.api, &plan.mode, self.poll.load_balancer);
                self.run(plan, &switch, nodeploy, diag).await
            }
            SwitchMode::TargetGroups(pairs) => {
                let switch = TargetGroupSwitch::resolve(
                    self.api,
                    pairs,
                    self.poll.load_balancer,
                    self.poll.target_group_settle,
                )
                .await?;
                self.run(plan, &switch, nodeploy, diag).await
            }
        }
    }

    async fn run<W: TrafficSwitch>(
        &self,
        plan: &BlueGreenPlan,
        switch: &W,
        nodeploy: bool,
        diag: &mut Diagnostics,
    ) -> Result<CutoverReport, SwitchError> {
        let cutover = Cutover::new(plan);
        let deployed = if nodeploy {
            cutover.skip_deploy()
        } else {
            let executor = ServicePlanExecutor::new(self.api, self.poll.ecs);
            cutover.deploy(&executor, diag).await?
        };

        let report = deployed
            .attach_next(switch)
            .await?
            .wait_in_service(switch)
            .await?
            .detach_current(switch)
            .await?
            .release_next_standby(switch)
            .await?
            .attach_current_standby(switch)
            .await?
            .finish(!nodeploy);
        Ok(report)
    }
}
