// ABOUTME: Registers task definitions loaded from task/*.yml.
// ABOUTME: Each file becomes a new revision of its family; nothing is diffed against live revisions.

use crate::aws::EcsOps;
use crate::aws::shared_types::RegisteredTaskDefinition;
use crate::config::TaskDefinition;

use super::error::PlanError;

pub struct TaskDefinitionRegistrar<'a, A> {
    api: &'a A,
}

impl<'a, A: EcsOps> TaskDefinitionRegistrar<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Register every definition in order, stopping at the first failure.
    pub async fn register_task_definitions(
        &self,
        tasks: &[TaskDefinition],
    ) -> Result<Vec<RegisteredTaskDefinition>, PlanError> {
        let mut registered = Vec::with_capacity(tasks.len());
        for task in tasks {
            tracing::info!(family = %task.family, containers = task.container_definitions.len(), "registering task definition");
            let revision = self
                .api
                .register_task_definition(&task.register_request())
                .await?;
            tracing::info!(task_definition = %revision.reference(), arn = %revision.arn, "registered task definition");
            registered.push(revision);
        }
        Ok(registered)
    }
}
