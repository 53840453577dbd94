// ABOUTME: `bluegreen plan` and `bluegreen apply` command implementations.
// ABOUTME: Builds both sides' cluster plans and blue-green plans, then runs cutovers.

use std::collections::{BTreeMap, BTreeSet};

use ecs_cutover::bluegreen::{BlueGreenDeployer, BlueGreenPlan, BlueGreenPlanBuilder};
use ecs_cutover::config::{BlueGreenDef, ConfigError};
use ecs_cutover::diagnostics::Diagnostics;
use ecs_cutover::error::{Error, Result};
use ecs_cutover::plan::Inventory;

use super::{Context, service};
use crate::cli::{BlueGreenArgs, ServiceArgs};

async fn build_plans(
    ctx: &Context,
    defs: &BTreeMap<String, BlueGreenDef>,
    diag: &mut Diagnostics,
) -> Result<Vec<BlueGreenPlan>> {
    if defs.is_empty() {
        return Err(Error::NoBlueGreenDefinitions);
    }

    // Only the clusters the definitions refer to.
    let wanted: BTreeSet<&str> = defs
        .values()
        .flat_map(|def| [def.blue.cluster.as_str(), def.green.cluster.as_str()])
        .collect();
    let clusters: Vec<_> = ctx
        .project
        .load_clusters(None)?
        .into_iter()
        .filter(|c| wanted.contains(c.name.as_str()))
        .collect();

    let cluster_plans = Inventory::new(&ctx.api)
        .build_service_update_plans(&clusters, diag)
        .await?;

    let plans = BlueGreenPlanBuilder::new(&ctx.api)
        .build_blue_green_plans(defs, &cluster_plans)
        .await?;
    Ok(plans)
}

pub async fn plan(ctx: &Context, args: &BlueGreenArgs) -> Result<()> {
    let defs = ctx.project.load_blue_green_defs(args.name.as_deref())?;
    let mut diag = Diagnostics::default();
    let plans = build_plans(ctx, &defs, &mut diag).await?;

    ctx.output.blue_green_plans(&plans);
    ctx.report(&diag);
    Ok(())
}

/// A named definition that does not exist falls back to a service apply of
/// the cluster with that name, unless `nodeploy` is set.
pub async fn apply(ctx: &mut Context, args: &BlueGreenArgs, nodeploy: bool) -> Result<()> {
    let defs = match (args.name.as_deref(), nodeploy) {
        (Some(name), false) => match ctx.project.load_blue_green_defs(Some(name)) {
            Ok(defs) => defs,
            Err(ConfigError::UnknownBlueGreen(_) | ConfigError::MissingDirectory(_)) => {
                tracing::info!(name, "no blue-green definition, updating cluster services");
                ctx.output.progress(&format!(
                    "No blue-green definition '{name}', applying services of cluster '{name}'"
                ));
                let service_args = ServiceArgs {
                    cluster: Some(name.to_string()),
                    service: None,
                };
                return service::apply(ctx, &service_args).await;
            }
            Err(e) => return Err(e.into()),
        },
        (name, _) => ctx.project.load_blue_green_defs(name)?,
    };

    ctx.output.start_timer();
    let mut diag = Diagnostics::default();
    let plans = build_plans(ctx, &defs, &mut diag).await?;

    ctx.output.blue_green_plans(&plans);

    let reports = BlueGreenDeployer::new(&ctx.api, &ctx.settings.poll)
        .apply_blue_green_deploys(&plans, nodeploy, &mut diag)
        .await?;

    ctx.report(&diag);
    ctx.output.cutover_reports(&reports);
    Ok(())
}
