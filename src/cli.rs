// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines the service, task and bluegreen subcommands and their arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ecs-cutover")]
#[command(about = "Plan/apply ECS services and blue-green load balancer cutovers")]
#[command(version)]
pub struct Cli {
    /// Project directory containing service/, task/ and bluegreen/
    #[arg(short = 'd', long = "project-dir", global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Template parameter, KEY=VALUE (repeatable)
    #[arg(short = 'p', long = "param", global = true)]
    pub params: Vec<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit JSON lines instead of human-readable output
    #[arg(long, global = true, conflicts_with = "quiet")]
    pub json: bool,

    /// Only print final results
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile ECS services with service/<cluster>.yml
    Service {
        #[command(subcommand)]
        action: ServiceAction,
    },

    /// Register task definitions from task/<family>.yml
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Switch traffic between blue and green autoscaling groups
    Bluegreen {
        #[command(subcommand)]
        action: BlueGreenAction,
    },
}

#[derive(Subcommand)]
pub enum ServiceAction {
    /// Show what apply would change
    Plan(ServiceArgs),
    /// Create, update and delete services
    Apply(ServiceArgs),
}

#[derive(Args)]
pub struct ServiceArgs {
    /// Only this cluster
    #[arg(short, long)]
    pub cluster: Option<String>,

    /// Only this service
    #[arg(short, long)]
    pub service: Option<String>,
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Show the task definitions apply would register
    Plan(TaskArgs),
    /// Register a new revision of each task definition
    Apply(TaskArgs),
}

#[derive(Args)]
pub struct TaskArgs {
    /// Only this task definition family
    #[arg(short = 't', long = "task")]
    pub family: Option<String>,
}

#[derive(Subcommand)]
pub enum BlueGreenAction {
    /// Show the current side and what the cutover would deploy
    Plan(BlueGreenArgs),
    /// Deploy the standby side and switch traffic to it
    Apply {
        #[command(flatten)]
        args: BlueGreenArgs,

        /// Only switch load balancers, skip service deployment
        #[arg(long)]
        nodeploy: bool,
    },
}

#[derive(Args)]
pub struct BlueGreenArgs {
    /// Only this blue-green definition
    #[arg(short = 'g', long = "group")]
    pub name: Option<String>,
}
