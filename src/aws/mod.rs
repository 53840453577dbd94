// ABOUTME: AWS access layer: capability traits, shared types and backends.
// ABOUTME: All orchestration code talks to AWS through the traits re-exported here.

pub mod cli;
pub mod error;
pub mod gateway;
pub mod shared_types;
pub mod traits;

pub use cli::AwsCli;
pub use error::{ApiError, ApiErrorKind};
pub use gateway::{RateLimited, ThrottlePolicy, retry_throttled};
pub use traits::{AppAutoScalingOps, AutoScalingOps, AwsApi, EcsOps, ElbV2Ops};
