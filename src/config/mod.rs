// ABOUTME: Project directory loader for cluster, task, blue-green and settings files.
// ABOUTME: Every file is passed through ${KEY|default} substitution before YAML parsing.

mod bluegreen;
mod error;
mod params;
mod service;
mod settings;
mod task;

pub use bluegreen::{BlueGreenDef, BlueGreenTarget, ChainElb, ElbV2, TargetGroupPair};
pub use error::ConfigError;
pub use params::{parse_key_values, substitute};
pub use service::{AutoScalingTarget, DesiredCluster, DesiredService, ServiceParseError};
pub use settings::{AwsSettings, PollSettings, Settings, ThrottleSettings};
pub use task::{TaskDefinition, TaskParseError};

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

pub const SERVICE_DIR: &str = "service";
pub const BLUEGREEN_DIR: &str = "bluegreen";
pub const TASK_DIR: &str = "task";
pub const SETTINGS_FILENAME: &str = "ecs-cutover.yml";

/// A project directory plus the `-p` parameters used to render its files.
#[derive(Debug, Clone)]
pub struct Project {
    dir: PathBuf,
    params: HashMap<String, String>,
}

impl Project {
    pub fn open(dir: impl Into<PathBuf>, params: HashMap<String, String>) -> Result<Self, ConfigError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(ConfigError::ProjectDirNotFound(dir));
        }
        Ok(Self { dir, params })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Settings from `ecs-cutover.yml`, or defaults when the file is absent.
    pub fn load_settings(&self) -> Result<Settings, ConfigError> {
        let path = self.dir.join(SETTINGS_FILENAME);
        if !path.exists() {
            return Ok(Settings::default());
        }
        let content = self.render(&path)?;
        Settings::from_yaml(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Desired clusters sorted by name. With a filter, only that cluster's
    /// file is loaded and it must exist.
    pub fn load_clusters(&self, cluster: Option<&str>) -> Result<Vec<DesiredCluster>, ConfigError> {
        let dir = self.dir.join(SERVICE_DIR);
        let files = yaml_files(&dir)?;

        if let Some(wanted) = cluster {
            if !files.contains_key(wanted) {
                return Err(ConfigError::UnknownCluster(wanted.to_string()));
            }
        }

        let mut clusters = Vec::new();
        for (name, path) in files {
            if cluster.is_some_and(|wanted| wanted != name) {
                continue;
            }
            let content = self.render(&path)?;
            let desired = DesiredCluster::from_yaml(&name, &content)
                .map_err(|source| ConfigError::Service { path, source })?;
            tracing::debug!(cluster = %name, services = desired.services.len(), "loaded cluster definition");
            clusters.push(desired);
        }
        Ok(clusters)
    }

    /// Task definitions sorted by family. With a filter, only that family's
    /// file is loaded and it must exist.
    pub fn load_task_definitions(&self, family: Option<&str>) -> Result<Vec<TaskDefinition>, ConfigError> {
        let dir = self.dir.join(TASK_DIR);
        let files = yaml_files(&dir)?;

        if let Some(wanted) = family {
            if !files.contains_key(wanted) {
                return Err(ConfigError::UnknownTaskDefinition(wanted.to_string()));
            }
        }

        let mut tasks = Vec::new();
        for (name, path) in files {
            if family.is_some_and(|wanted| wanted != name) {
                continue;
            }
            let content = self.render(&path)?;
            let task = TaskDefinition::from_yaml(&name, &content)
                .map_err(|source| ConfigError::Task { path, source })?;
            tracing::debug!(family = %name, containers = task.container_definitions.len(), "loaded task definition");
            tasks.push(task);
        }
        Ok(tasks)
    }

    /// Blue-green definitions keyed by file stem.
    pub fn load_blue_green_defs(
        &self,
        name: Option<&str>,
    ) -> Result<BTreeMap<String, BlueGreenDef>, ConfigError> {
        let dir = self.dir.join(BLUEGREEN_DIR);
        let files = yaml_files(&dir)?;

        if let Some(wanted) = name {
            if !files.contains_key(wanted) {
                return Err(ConfigError::UnknownBlueGreen(wanted.to_string()));
            }
        }

        let mut defs = BTreeMap::new();
        for (def_name, path) in files {
            if name.is_some_and(|wanted| wanted != def_name) {
                continue;
            }
            let content = self.render(&path)?;
            let def = BlueGreenDef::from_yaml(&content).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;
            def.validate(&def_name)?;
            defs.insert(def_name, def);
        }
        Ok(defs)
    }

    fn render(&self, path: &Path) -> Result<String, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(substitute(&raw, &self.params))
    }
}

/// `*.yml` / `*.yaml` files in `dir`, keyed by file stem.
fn yaml_files(dir: &Path) -> Result<BTreeMap<String, PathBuf>, ConfigError> {
    if !dir.is_dir() {
        return Err(ConfigError::MissingDirectory(dir.to_path_buf()));
    }

    let entries = std::fs::read_dir(dir).map_err(|source| ConfigError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = BTreeMap::new();
    for entry in entries {
        let path = entry
            .map_err(|source| ConfigError::Read {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "yml" || ext == "yaml");
        if !is_yaml || !path.is_file() {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            files.insert(stem.to_string(), path.clone());
        }
    }
    Ok(files)
}
