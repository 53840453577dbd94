// ABOUTME: `service plan` and `service apply` command implementations.
// ABOUTME: Builds service update plans from live state and applies them in order.

use ecs_cutover::config::DesiredCluster;
use ecs_cutover::diagnostics::Diagnostics;
use ecs_cutover::error::Result;
use ecs_cutover::plan::{Inventory, ServicePlanExecutor, ServiceUpdatePlan};

use super::Context;
use crate::cli::ServiceArgs;

async fn build_plans(
    ctx: &Context,
    args: &ServiceArgs,
    diag: &mut Diagnostics,
) -> Result<Vec<ServiceUpdatePlan>> {
    let clusters: Vec<DesiredCluster> = ctx.project.load_clusters(args.cluster.as_deref())?;
    let plans = Inventory::new(&ctx.api)
        .with_service_filter(args.service.clone())
        .build_service_update_plans(&clusters, diag)
        .await?;
    Ok(plans)
}

pub async fn plan(ctx: &Context, args: &ServiceArgs) -> Result<()> {
    let mut diag = Diagnostics::default();
    let plans = build_plans(ctx, args, &mut diag).await?;

    ctx.output.service_plans(&plans);
    ctx.report(&diag);
    Ok(())
}

pub async fn apply(ctx: &mut Context, args: &ServiceArgs) -> Result<()> {
    ctx.output.start_timer();
    let mut diag = Diagnostics::default();
    let plans = build_plans(ctx, args, &mut diag).await?;

    ctx.output.service_plans(&plans);
    ctx.output
        .progress(&format!("Applying {} cluster plan(s)...", plans.len()));

    ServicePlanExecutor::new(&ctx.api, ctx.settings.poll.ecs)
        .apply_service_plans(&plans, &mut diag)
        .await?;

    ctx.report(&diag);
    ctx.output.success("Service apply complete");
    Ok(())
}
