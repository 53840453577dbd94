// ABOUTME: Task definitions loaded from task/<family>.yml.
// ABOUTME: Each top-level key is a container; its body is ECS container definition JSON, passed through as-is.

use serde::Serialize;
use serde_json::Value;

use crate::aws::shared_types::RegisterTaskDefinitionRequest;
use crate::types::ResourceName;

/// One task definition family and its containers in file order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDefinition {
    pub family: ResourceName,
    pub container_definitions: Vec<Value>,
}

impl TaskDefinition {
    /// Parse a task file. The container name is taken from the key unless
    /// the body sets `name` itself.
    pub fn from_yaml(family: &str, yaml: &str) -> Result<Self, TaskParseError> {
        let family = ResourceName::new(family).map_err(|e| TaskParseError::Family {
            name: family.to_string(),
            reason: e.to_string(),
        })?;

        let containers: Option<serde_yaml::Mapping> =
            serde_yaml::from_str(yaml).map_err(TaskParseError::Yaml)?;
        let containers = containers.unwrap_or_default();
        if containers.is_empty() {
            return Err(TaskParseError::NoContainers);
        }

        let mut container_definitions = Vec::with_capacity(containers.len());
        for (key, body) in containers {
            let name = key
                .as_str()
                .ok_or_else(|| TaskParseError::ContainerKey(format!("{key:?}")))?
                .to_string();
            let mut definition = serde_json::to_value(&body).map_err(|source| {
                TaskParseError::Json {
                    name: name.clone(),
                    source,
                }
            })?;
            let Some(fields) = definition.as_object_mut() else {
                return Err(TaskParseError::NotAMapping(name));
            };
            fields
                .entry("name")
                .or_insert_with(|| Value::String(name.clone()));
            container_definitions.push(definition);
        }

        Ok(Self {
            family,
            container_definitions,
        })
    }

    pub fn container_names(&self) -> impl Iterator<Item = &str> {
        self.container_definitions
            .iter()
            .filter_map(|c| c.get("name").and_then(Value::as_str))
    }

    pub fn register_request(&self) -> RegisterTaskDefinitionRequest {
        RegisterTaskDefinitionRequest {
            family: self.family.to_string(),
            container_definitions: self.container_definitions.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TaskParseError {
    #[error("{0}")]
    Yaml(serde_yaml::Error),

    #[error("invalid task definition family '{name}': {reason}")]
    Family { name: String, reason: String },

    #[error("no container definitions")]
    NoContainers,

    #[error("container key must be a string, got {0}")]
    ContainerKey(String),

    #[error("container '{0}' must be a mapping")]
    NotAMapping(String),

    #[error("container '{name}' is not valid JSON: {source}")]
    Json {
        name: String,
        source: serde_json::Error,
    },
}
