// ABOUTME: `task plan` and `task apply` command implementations.
// ABOUTME: Loads task/*.yml and registers one new revision per family.

use ecs_cutover::error::Result;
use ecs_cutover::plan::TaskDefinitionRegistrar;

use super::Context;
use crate::cli::TaskArgs;

pub fn plan(ctx: &Context, args: &TaskArgs) -> Result<()> {
    let tasks = ctx.project.load_task_definitions(args.family.as_deref())?;
    ctx.output.task_plans(&tasks);
    Ok(())
}

pub async fn apply(ctx: &mut Context, args: &TaskArgs) -> Result<()> {
    ctx.output.start_timer();
    let tasks = ctx.project.load_task_definitions(args.family.as_deref())?;
    ctx.output.task_plans(&tasks);

    let registered = TaskDefinitionRegistrar::new(&ctx.api)
        .register_task_definitions(&tasks)
        .await?;

    ctx.output.registered_task_definitions(&registered);
    Ok(())
}
