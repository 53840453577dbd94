// ABOUTME: Application-wide error type for ecs-cutover.
// ABOUTME: Wraps each layer's error so the CLI can print one message and exit non-zero.

use thiserror::Error;

use crate::aws::ApiError;
use crate::bluegreen::SwitchError;
use crate::config::ConfigError;
use crate::plan::PlanError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Switch(#[from] SwitchError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("no blue-green definitions found")]
    NoBlueGreenDefinitions,
}

pub type Result<T> = std::result::Result<T, Error>;
