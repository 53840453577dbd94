// ABOUTME: Errors raised while loading the project directory.
// ABOUTME: Every variant names the file or key that could not be used.

use std::path::PathBuf;

use super::service::ServiceParseError;
use super::task::TaskParseError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("project directory not found: {0}")]
    ProjectDirNotFound(PathBuf),

    #[error("directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid parameter '{0}', expected KEY=VALUE")]
    InvalidParameter(String),

    #[error("invalid cluster file {path}: {source}")]
    Service {
        path: PathBuf,
        source: ServiceParseError,
    },

    #[error("cluster definition not found: {0}")]
    UnknownCluster(String),

    #[error("invalid task file {path}: {source}")]
    Task {
        path: PathBuf,
        source: TaskParseError,
    },

    #[error("task definition not found: {0}")]
    UnknownTaskDefinition(String),

    #[error("blue-green definition not found: {0}")]
    UnknownBlueGreen(String),

    #[error("blue-green definition '{0}' needs primary_elb and standby_elb without elbv2.target_groups")]
    MissingClassicElb(String),
}
