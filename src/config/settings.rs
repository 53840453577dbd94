// ABOUTME: Tool settings from the optional ecs-cutover.yml at the project root.
// ABOUTME: Poll policies, throttle retry behavior and AWS CLI profile/region.

use std::time::Duration;

use serde::Deserialize;

use crate::aws::ThrottlePolicy;
use crate::poll::PollPolicy;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub poll: PollSettings,
    #[serde(default)]
    pub throttle: ThrottleSettings,
    #[serde(default)]
    pub aws: AwsSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PollSettings {
    #[serde(default = "PollPolicy::ecs_default")]
    pub ecs: PollPolicy,
    #[serde(default = "PollPolicy::load_balancer_default")]
    pub load_balancer: PollPolicy,
    /// Pause after a target group reports in service, before the old side
    /// is detached.
    #[serde(default = "default_target_group_settle", with = "humantime_serde")]
    pub target_group_settle: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            ecs: PollPolicy::ecs_default(),
            load_balancer: PollPolicy::load_balancer_default(),
            target_group_settle: default_target_group_settle(),
        }
    }
}

fn default_target_group_settle() -> Duration {
    Duration::from_secs(5)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThrottleSettings {
    #[serde(default = "default_throttle_delay", with = "humantime_serde")]
    pub delay: Duration,
    #[serde(default)]
    pub max_retries: Option<u32>,
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self {
            delay: default_throttle_delay(),
            max_retries: None,
        }
    }
}

fn default_throttle_delay() -> Duration {
    Duration::from_secs(15)
}

impl ThrottleSettings {
    pub fn policy(&self) -> ThrottlePolicy {
        ThrottlePolicy {
            delay: self.delay,
            max_retries: self.max_retries,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AwsSettings {
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        let parsed: Option<Settings> = serde_yaml::from_str(yaml)?;
        Ok(parsed.unwrap_or_default())
    }
}
