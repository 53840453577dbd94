// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod id;
mod resource_name;

pub use id::{
    ContainerInstanceArn, DeploymentId, Id, ServiceArn, TargetGroupArn, TaskArn, TaskDefinitionArn,
};
pub use resource_name::{ResourceName, ResourceNameError};
