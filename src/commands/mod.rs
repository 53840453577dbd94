// ABOUTME: Command handlers for the ecs-cutover CLI.
// ABOUTME: Builds the shared context (project, settings, rate-limited AWS backend, output).

pub mod bluegreen;
pub mod service;
pub mod task;

use std::path::Path;

use ecs_cutover::aws::{AwsCli, RateLimited};
use ecs_cutover::config::{Project, Settings, parse_key_values};
use ecs_cutover::diagnostics::Diagnostics;
use ecs_cutover::error::Result;
use ecs_cutover::output::Output;

/// Everything a command needs, passed explicitly.
pub struct Context {
    pub project: Project,
    pub settings: Settings,
    pub api: RateLimited<AwsCli>,
    pub output: Output,
}

impl Context {
    pub fn load(project_dir: &Path, params: &[String], output: Output) -> Result<Self> {
        let params = parse_key_values(params)?;
        let project = Project::open(project_dir, params)?;
        let settings = project.load_settings()?;

        let cli = AwsCli::new()
            .with_profile(settings.aws.profile.clone())
            .with_region(settings.aws.region.clone());
        let api = RateLimited::new(cli, settings.throttle.policy());

        tracing::debug!(project = %project.dir().display(), ?settings, "loaded project");
        Ok(Self {
            project,
            settings,
            api,
            output,
        })
    }

    /// Print collected warnings.
    pub fn report(&self, diag: &Diagnostics) {
        for warning in diag.warnings() {
            self.output.warning(&warning.message);
        }
    }
}
