// ABOUTME: Blue-green plan types: both sides' live state plus how traffic is switched.
// ABOUTME: The live side is derived from current load balancer attachments, never stored.

use std::fmt;

use nonempty::NonEmpty;
use serde::Serialize;

use crate::aws::shared_types::{AutoScalingGroup, LiveService};
use crate::config::{BlueGreenTarget, ChainElb, TargetGroupPair};
use crate::plan::ServiceUpdatePlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Blue,
    Green,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Blue => Side::Green,
            Side::Green => Side::Blue,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Blue => write!(f, "blue"),
            Side::Green => write!(f, "green"),
        }
    }
}

/// One side of a cutover.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceSet {
    pub target: BlueGreenTarget,
    pub service: LiveService,
    pub group: AutoScalingGroup,
    pub cluster_plan: ServiceUpdatePlan,
}

/// How traffic moves between the two autoscaling groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchMode {
    /// Classic load balancers, switched by name.
    Classic {
        primary: String,
        standby: String,
        chain: Vec<ChainElb>,
    },
    /// ALB target groups, switched by ARN after name resolution.
    TargetGroups(NonEmpty<TargetGroupPair>),
}

impl SwitchMode {
    /// Load balancers or target group names serving live traffic.
    pub fn primary_group(&self) -> Vec<String> {
        match self {
            SwitchMode::Classic { primary, chain, .. } => std::iter::once(primary.clone())
                .chain(chain.iter().map(|c| c.primary_elb.clone()))
                .collect(),
            SwitchMode::TargetGroups(pairs) => pairs.iter().map(|p| p.primary_group.clone()).collect(),
        }
    }

    pub fn standby_group(&self) -> Vec<String> {
        match self {
            SwitchMode::Classic { standby, chain, .. } => std::iter::once(standby.clone())
                .chain(chain.iter().map(|c| c.standby_elb.clone()))
                .collect(),
            SwitchMode::TargetGroups(pairs) => pairs.iter().map(|p| p.standby_group.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BlueGreenPlan {
    pub name: String,
    pub blue: ServiceSet,
    pub green: ServiceSet,
    pub mode: SwitchMode,
}

impl BlueGreenPlan {
    /// Whether the blue group is attached to the primary load balancer
    /// (classic) or to the first primary target group (target groups).
    pub fn is_blue_with_primary(&self) -> bool {
        let group = &self.blue.group;
        match &self.mode {
            SwitchMode::Classic { primary, .. } => {
                group.load_balancer_names.iter().any(|lb| lb == primary)
            }
            SwitchMode::TargetGroups(pairs) => group
                .target_group_arns
                .iter()
                .any(|arn| arn.target_group_name() == Some(pairs.head.primary_group.as_str())),
        }
    }

    /// The side serving live traffic right now.
    pub fn current_side(&self) -> Side {
        if self.is_blue_with_primary() {
            Side::Blue
        } else {
            Side::Green
        }
    }

    pub fn side(&self, side: Side) -> &ServiceSet {
        match side {
            Side::Blue => &self.blue,
            Side::Green => &self.green,
        }
    }
}
