// ABOUTME: AutoScalingOps over `aws autoscaling`.
// ABOUTME: Group descriptions plus classic LB and target group attach/detach.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::responses::{
    DescribeAutoScalingGroups, DescribeLoadBalancerTargetGroups, DescribeLoadBalancers,
};
use super::{AwsCli, flag, list_flag};
use crate::aws::error::ApiError;
use crate::aws::shared_types::{AttachmentState, AutoScalingGroup, TargetGroupAttachment};
use crate::aws::traits::AutoScalingOps;
use crate::types::TargetGroupArn;

fn group_args(group: &str, list_name: &str, values: &[impl ToString]) -> Vec<String> {
    let mut args = flag("--auto-scaling-group-name", group).to_vec();
    args.extend(list_flag(list_name, values));
    args
}

#[async_trait]
impl AutoScalingOps for AwsCli {
    async fn describe_auto_scaling_groups(
        &self,
        names: &[String],
    ) -> Result<BTreeMap<String, AutoScalingGroup>, ApiError> {
        if names.is_empty() {
            return Ok(BTreeMap::new());
        }
        let out: DescribeAutoScalingGroups = self
            .call(
                "autoscaling",
                "describe-auto-scaling-groups",
                &list_flag("--auto-scaling-group-names", names),
            )
            .await?;

        Ok(out
            .auto_scaling_groups
            .into_iter()
            .map(AutoScalingGroup::from)
            .map(|g| (g.name.clone(), g))
            .collect())
    }

    async fn describe_load_balancer_state(
        &self,
        group: &str,
    ) -> Result<BTreeMap<String, AttachmentState>, ApiError> {
        let out: DescribeLoadBalancers = self
            .call(
                "autoscaling",
                "describe-load-balancers",
                &flag("--auto-scaling-group-name", group),
            )
            .await?;

        Ok(out
            .load_balancers
            .into_iter()
            .map(|lb| (lb.load_balancer_name, AttachmentState::parse(&lb.state)))
            .collect())
    }

    async fn describe_load_balancer_target_groups(
        &self,
        group: &str,
    ) -> Result<Vec<TargetGroupAttachment>, ApiError> {
        let out: DescribeLoadBalancerTargetGroups = self
            .call(
                "autoscaling",
                "describe-load-balancer-target-groups",
                &flag("--auto-scaling-group-name", group),
            )
            .await?;

        Ok(out
            .load_balancer_target_groups
            .into_iter()
            .map(TargetGroupAttachment::from)
            .collect())
    }

    async fn attach_load_balancers(&self, group: &str, names: &[String]) -> Result<(), ApiError> {
        self.call_unit(
            "autoscaling",
            "attach-load-balancers",
            &group_args(group, "--load-balancer-names", names),
        )
        .await
    }

    async fn detach_load_balancers(&self, group: &str, names: &[String]) -> Result<(), ApiError> {
        self.call_unit(
            "autoscaling",
            "detach-load-balancers",
            &group_args(group, "--load-balancer-names", names),
        )
        .await
    }

    async fn attach_load_balancer_target_groups(
        &self,
        group: &str,
        arns: &[TargetGroupArn],
    ) -> Result<(), ApiError> {
        self.call_unit(
            "autoscaling",
            "attach-load-balancer-target-groups",
            &group_args(group, "--target-group-arns", arns),
        )
        .await
    }

    async fn detach_load_balancer_target_groups(
        &self,
        group: &str,
        arns: &[TargetGroupArn],
    ) -> Result<(), ApiError> {
        self.call_unit(
            "autoscaling",
            "detach-load-balancer-target-groups",
            &group_args(group, "--target-group-arns", arns),
        )
        .await
    }
}
