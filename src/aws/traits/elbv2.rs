// ABOUTME: Elastic Load Balancing v2 operations trait.
// ABOUTME: Resolves target group names to ARNs.

use crate::aws::error::ApiError;
use crate::types::TargetGroupArn;
use async_trait::async_trait;
use std::collections::BTreeMap;

#[async_trait]
pub trait ElbV2Ops: Send + Sync {
    /// Describe target groups by name, keyed by name.
    async fn describe_target_groups(
        &self,
        names: &[String],
    ) -> Result<BTreeMap<String, TargetGroupArn>, ApiError>;
}
