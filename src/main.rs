// ABOUTME: Entry point for the ecs-cutover CLI application.
// ABOUTME: Parses arguments, initialises tracing and dispatches to command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{BlueGreenAction, Cli, Commands, ServiceAction, TaskAction};
use commands::Context;
use ecs_cutover::error::Result;
use ecs_cutover::output::{Output, OutputMode};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise -v selects debug everywhere.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("ecs_cutover=info,warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cli.verbose)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    if let Err(e) = run(cli, mode).await {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mode: OutputMode) -> Result<()> {
    let mut ctx = Context::load(&cli.project_dir, &cli.params, Output::new(mode))?;

    match cli.command {
        Commands::Service { action } => match action {
            ServiceAction::Plan(args) => commands::service::plan(&ctx, &args).await,
            ServiceAction::Apply(args) => commands::service::apply(&mut ctx, &args).await,
        },
        Commands::Task { action } => match action {
            TaskAction::Plan(args) => commands::task::plan(&ctx, &args),
            TaskAction::Apply(args) => commands::task::apply(&mut ctx, &args).await,
        },
        Commands::Bluegreen { action } => match action {
            BlueGreenAction::Plan(args) => commands::bluegreen::plan(&ctx, &args).await,
            BlueGreenAction::Apply { args, nodeploy } => {
                commands::bluegreen::apply(&mut ctx, &args, nodeploy).await
            }
        },
    }
}
