// ABOUTME: AWS backend that drives the `aws` command line client.
// ABOUTME: Credentials, SSO and profiles are resolved by the CLI itself.

mod app_autoscaling;
mod autoscaling;
mod ecs;
mod elbv2;
mod responses;

use serde::de::DeserializeOwned;
use snafu::{ResultExt, Snafu, ensure};
use tokio::process::Command;

use crate::aws::error::ApiError;

/// Failures running the `aws` binary.
#[derive(Debug, Snafu)]
pub enum CliError {
    #[snafu(display("failed to run `aws {operation}`: {source}"))]
    Spawn {
        operation: String,
        source: std::io::Error,
    },

    #[snafu(display("`aws {operation}` exited with {status}: {stderr}"))]
    Failed {
        operation: String,
        status: String,
        stderr: String,
    },

    #[snafu(display("could not decode `aws {operation}` output: {source}"))]
    Decode {
        operation: String,
        source: serde_json::Error,
    },
}

impl From<CliError> for ApiError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::Spawn { .. } => ApiError::Transport(err.to_string()),
            CliError::Failed {
                operation, stderr, ..
            } => ApiError::Call {
                operation,
                message: stderr,
            },
            CliError::Decode { ref operation, .. } => {
                ApiError::response(operation.clone(), err.to_string())
            }
        }
    }
}

/// An AWS backend that shells out to `aws <service> <operation> --output json`.
#[derive(Debug, Clone)]
pub struct AwsCli {
    program: String,
    profile: Option<String>,
    region: Option<String>,
}

impl Default for AwsCli {
    fn default() -> Self {
        Self::new()
    }
}

impl AwsCli {
    pub fn new() -> Self {
        Self {
            program: "aws".to_string(),
            profile: None,
            region: None,
        }
    }

    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    /// Use a different executable (for wrappers such as `aws-vault exec`).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn command(&self, service: &str, operation: &str, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(service).arg(operation).args(args);
        cmd.args(["--output", "json"]);
        if let Some(profile) = &self.profile {
            cmd.args(["--profile", profile]);
        }
        if let Some(region) = &self.region {
            cmd.args(["--region", region]);
        }
        cmd.kill_on_drop(true);
        cmd
    }

    async fn run(&self, service: &str, operation: &str, args: &[String]) -> Result<Vec<u8>, CliError> {
        let label = format!("{service} {operation}");
        tracing::debug!(command = %label, ?args, "invoking aws cli");

        let output = self
            .command(service, operation, args)
            .output()
            .await
            .context(SpawnSnafu {
                operation: label.clone(),
            })?;

        ensure!(
            output.status.success(),
            FailedSnafu {
                operation: label,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
        );

        Ok(output.stdout)
    }

    /// Run an operation and decode its JSON output.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        service: &str,
        operation: &str,
        args: &[String],
    ) -> Result<T, ApiError> {
        let stdout = self.run(service, operation, args).await?;
        let decoded = serde_json::from_slice(&stdout).context(DecodeSnafu {
            operation: format!("{service} {operation}"),
        })?;
        Ok(decoded)
    }

    /// Run an operation whose output is not needed.
    pub(crate) async fn call_unit(
        &self,
        service: &str,
        operation: &str,
        args: &[String],
    ) -> Result<(), ApiError> {
        self.run(service, operation, args).await?;
        Ok(())
    }
}

/// Build an argument vector from flag/value pairs and list flags.
pub(crate) fn flag(name: &str, value: impl ToString) -> [String; 2] {
    [name.to_string(), value.to_string()]
}

pub(crate) fn list_flag<T: ToString>(name: &str, values: &[T]) -> Vec<String> {
    std::iter::once(name.to_string())
        .chain(values.iter().map(ToString::to_string))
        .collect()
}
