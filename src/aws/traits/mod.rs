// ABOUTME: Composable capability traits for the AWS APIs this tool drives.
// ABOUTME: Defines EcsOps, AutoScalingOps, AppAutoScalingOps, ElbV2Ops and AwsApi.

mod app_autoscaling;
mod autoscaling;
mod ecs;
mod elbv2;

pub use app_autoscaling::AppAutoScalingOps;
pub use autoscaling::AutoScalingOps;
pub use ecs::EcsOps;
pub use elbv2::ElbV2Ops;

/// Every capability together. Implemented automatically for any type that
/// implements all of the capability traits.
pub trait AwsApi: EcsOps + AutoScalingOps + AppAutoScalingOps + ElbV2Ops {}

impl<T> AwsApi for T where T: EcsOps + AutoScalingOps + AppAutoScalingOps + ElbV2Ops {}
