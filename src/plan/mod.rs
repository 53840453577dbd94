// ABOUTME: Service reconciliation: inventory builds plans, the executor applies them.
// ABOUTME: Also registers task definitions, whose revisions services reference.

mod error;
mod executor;
mod inventory;
mod plan;
mod task;
mod watch;

pub use error::{PlanError, PlanErrorKind};
pub use executor::{ServicePlanExecutor, outgoing_deployment};
pub use inventory::Inventory;
pub use plan::{LiveServiceStack, ServiceUpdatePlan};
pub use task::TaskDefinitionRegistrar;
pub use watch::TaskWatchStatus;
