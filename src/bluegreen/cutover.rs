// ABOUTME: Blue-green cutover as a type-state machine over a TrafficSwitch.
// ABOUTME: Each step consumes the cutover and returns the next state on success.

use std::marker::PhantomData;

use serde::Serialize;

use crate::aws::{AppAutoScalingOps, EcsOps};
use crate::diagnostics::Diagnostics;
use crate::plan::ServicePlanExecutor;

use super::error::SwitchError;
use super::plan::{BlueGreenPlan, ServiceSet, Side};
use super::state::{
    Completed, CurrentDetached, Deployed, NextAttached, NextInService, NextReleased, Planned,
};
use super::switcher::{Tier, TrafficSwitch};

/// A cutover in progress, parameterized by the last completed step.
///
/// The old side can only be detached from the primary tier once the new
/// side has been confirmed in service:
///
/// ```compile_fail
/// use ecs_cutover::bluegreen::{Cutover, NextAttached, TrafficSwitch};
///
/// async fn skip_wait<S: TrafficSwitch>(cutover: Cutover<'_, NextAttached>, switch: &S) {
///     let _ = cutover.detach_current(switch).await;
/// }
/// ```
#[derive(Debug)]
pub struct Cutover<'p, S> {
    plan: &'p BlueGreenPlan,
    current: Side,
    _state: PhantomData<S>,
}

/// What a finished cutover did.
#[derive(Debug, Clone, Serialize)]
pub struct CutoverReport {
    pub name: String,
    pub previous: Side,
    pub live: Side,
    pub deployed: bool,
}

impl<'p, S> Cutover<'p, S> {
    fn transition<T>(self) -> Cutover<'p, T> {
        Cutover {
            plan: self.plan,
            current: self.current,
            _state: PhantomData,
        }
    }

    /// The side serving traffic when the cutover started.
    pub fn current_side(&self) -> Side {
        self.current
    }

    /// The side that will serve traffic afterwards.
    pub fn next_side(&self) -> Side {
        self.current.other()
    }

    fn current_set(&self) -> &'p ServiceSet {
        self.plan.side(self.current)
    }

    fn next_set(&self) -> &'p ServiceSet {
        self.plan.side(self.current.other())
    }
}

impl<'p> Cutover<'p, Planned> {
    /// Start a cutover. The live side is read from the plan's group attachments.
    pub fn new(plan: &'p BlueGreenPlan) -> Self {
        let current = plan.current_side();
        tracing::info!(
            bluegreen = %plan.name,
            current = %current,
            next = %current.other(),
            "starting blue-green cutover"
        );
        Cutover {
            plan,
            current,
            _state: PhantomData,
        }
    }

    /// Apply the next side's cluster plan.
    #[must_use = "cutover state must be used"]
    pub async fn deploy<A: EcsOps + AppAutoScalingOps>(
        self,
        executor: &ServicePlanExecutor<'_, A>,
        diag: &mut Diagnostics,
    ) -> Result<Cutover<'p, Deployed>, SwitchError> {
        let next = self.next_set();
        tracing::info!(
            side = %self.next_side(),
            cluster = %next.target.cluster,
            service = %next.target.service,
            "deploying next side"
        );
        executor.apply_service_plan(&next.cluster_plan, diag).await?;
        Ok(self.transition())
    }

    /// Switch load balancers only.
    pub fn skip_deploy(self) -> Cutover<'p, Deployed> {
        tracing::info!("skipping deployment, only switching load balancers");
        self.transition()
    }
}

impl<'p> Cutover<'p, Deployed> {
    #[must_use = "cutover state must be used"]
    pub async fn attach_next<W: TrafficSwitch>(
        self,
        switch: &W,
    ) -> Result<Cutover<'p, NextAttached>, SwitchError> {
        switch.attach(&self.next_set().group.name, Tier::Primary).await?;
        tracing::info!(side = %self.next_side(), "attached to primary");
        Ok(self.transition())
    }
}

impl<'p> Cutover<'p, NextAttached> {
    #[must_use = "cutover state must be used"]
    pub async fn wait_in_service<W: TrafficSwitch>(
        self,
        switch: &W,
    ) -> Result<Cutover<'p, NextInService>, SwitchError> {
        switch.wait_primary_ready(&self.next_set().group.name).await?;
        tracing::info!(side = %self.next_side(), "serving on primary");

        let settle = switch.settle_delay();
        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }
        Ok(self.transition())
    }
}

impl<'p> Cutover<'p, NextInService> {
    #[must_use = "cutover state must be used"]
    pub async fn detach_current<W: TrafficSwitch>(
        self,
        switch: &W,
    ) -> Result<Cutover<'p, CurrentDetached>, SwitchError> {
        switch.detach(&self.current_set().group.name, Tier::Primary).await?;
        tracing::info!(side = %self.current_side(), "detached from primary");
        Ok(self.transition())
    }
}

impl<'p> Cutover<'p, CurrentDetached> {
    #[must_use = "cutover state must be used"]
    pub async fn release_next_standby<W: TrafficSwitch>(
        self,
        switch: &W,
    ) -> Result<Cutover<'p, NextReleased>, SwitchError> {
        switch.detach(&self.next_set().group.name, Tier::Standby).await?;
        tracing::info!(side = %self.next_side(), "detached from standby");
        Ok(self.transition())
    }
}

impl<'p> Cutover<'p, NextReleased> {
    #[must_use = "cutover state must be used"]
    pub async fn attach_current_standby<W: TrafficSwitch>(
        self,
        switch: &W,
    ) -> Result<Cutover<'p, Completed>, SwitchError> {
        switch.attach(&self.current_set().group.name, Tier::Standby).await?;
        tracing::info!(side = %self.current_side(), "attached to standby");
        Ok(self.transition())
    }
}

impl Cutover<'_, Completed> {
    pub fn finish(self, deployed: bool) -> CutoverReport {
        tracing::info!(bluegreen = %self.plan.name, live = %self.next_side(), "cutover complete");
        CutoverReport {
            name: self.plan.name.clone(),
            previous: self.current,
            live: self.next_side(),
            deployed,
        }
    }
}
