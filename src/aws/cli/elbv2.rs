// ABOUTME: ElbV2Ops over `aws elbv2`.
// ABOUTME: Target group name to ARN lookup.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::responses::DescribeTargetGroups;
use super::{AwsCli, list_flag};
use crate::aws::error::ApiError;
use crate::aws::traits::ElbV2Ops;
use crate::types::TargetGroupArn;

#[async_trait]
impl ElbV2Ops for AwsCli {
    async fn describe_target_groups(
        &self,
        names: &[String],
    ) -> Result<BTreeMap<String, TargetGroupArn>, ApiError> {
        if names.is_empty() {
            return Ok(BTreeMap::new());
        }
        let out: DescribeTargetGroups = self
            .call("elbv2", "describe-target-groups", &list_flag("--names", names))
            .await?;
        Ok(out
            .target_groups
            .into_iter()
            .map(|tg| (tg.target_group_name, tg.target_group_arn))
            .collect())
    }
}
