// ABOUTME: Blue-green pair definitions loaded from bluegreen/<name>.yml.
// ABOUTME: Declares both sides plus either classic ELB names or ALB target group pairs.

use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// One blue-green pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlueGreenDef {
    pub blue: BlueGreenTarget,
    pub green: BlueGreenTarget,
    #[serde(default)]
    pub primary_elb: String,
    #[serde(default)]
    pub standby_elb: String,
    #[serde(default)]
    pub chain_elb: Vec<ChainElb>,
    #[serde(default)]
    pub elbv2: Option<ElbV2>,
}

/// One side's cluster, service and autoscaling group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueGreenTarget {
    pub cluster: String,
    pub service: String,
    pub autoscaling_group: String,
}

/// Extra classic load balancers switched together with the primary pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainElb {
    pub primary_elb: String,
    pub standby_elb: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElbV2 {
    #[serde(default)]
    pub target_groups: Vec<TargetGroupPair>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetGroupPair {
    pub primary_group: String,
    pub standby_group: String,
}

impl BlueGreenDef {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Target group pairs when this pair is switched with ALB target groups.
    /// `None` selects classic load balancer switching.
    pub fn target_group_pairs(&self) -> Option<NonEmpty<TargetGroupPair>> {
        self.elbv2
            .as_ref()
            .and_then(|v2| NonEmpty::from_vec(v2.target_groups.clone()))
    }

    /// Classic mode needs both load balancer names. `name` is the
    /// definition's file stem.
    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.target_group_pairs().is_some() {
            return Ok(());
        }
        if self.primary_elb.is_empty() || self.standby_elb.is_empty() {
            return Err(ConfigError::MissingClassicElb(name.to_string()));
        }
        Ok(())
    }
}
