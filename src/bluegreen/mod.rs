// ABOUTME: Blue-green cutovers between two autoscaling groups behind a load balancer.
// ABOUTME: Plan building, the type-state cutover and the classic/target group switches.

mod builder;
mod cutover;
mod error;
mod plan;
mod state;
mod switcher;

pub use builder::BlueGreenPlanBuilder;
pub use cutover::{Cutover, CutoverReport};
pub use error::{SwitchError, SwitchErrorKind};
pub use plan::{BlueGreenPlan, ServiceSet, Side, SwitchMode};
pub use state::{
    Completed, CurrentDetached, Deployed, NextAttached, NextInService, NextReleased, Planned,
};
pub use switcher::{BlueGreenDeployer, ClassicElbSwitch, TargetGroupSwitch, Tier, TrafficSwitch};
