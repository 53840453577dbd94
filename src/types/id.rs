// ABOUTME: Phantom-typed identifiers for compile-time type safety.
// ABOUTME: Keeps service, task, instance, target group and deployment IDs apart.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Marker types for phantom type parameters.
/// Using empty enums prevents instantiation and requires no trait bounds.
pub enum ServiceArnMarker {}
pub enum TaskArnMarker {}
pub enum TaskDefinitionArnMarker {}
pub enum ContainerInstanceArnMarker {}
pub enum TargetGroupArnMarker {}
pub enum DeploymentMarker {}

/// A type-safe identifier that prevents accidental mixing of different ID types.
///
/// A `TaskArn` cannot be passed where a `TargetGroupArn` is expected, and a
/// deployment id cannot be compared against a task's ARN by mistake.
#[must_use = "IDs reference resources and should not be ignored"]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }
}

// Manual trait implementations that don't require T to implement the trait.
// T is only a phantom marker.

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Id").field(&self.value).finish()
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> std::fmt::Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::new(value))
    }
}

pub type ServiceArn = Id<ServiceArnMarker>;
pub type TaskArn = Id<TaskArnMarker>;
pub type TaskDefinitionArn = Id<TaskDefinitionArnMarker>;
pub type ContainerInstanceArn = Id<ContainerInstanceArnMarker>;
pub type TargetGroupArn = Id<TargetGroupArnMarker>;
pub type DeploymentId = Id<DeploymentMarker>;

impl Id<TargetGroupArnMarker> {
    /// Name segment of a target group ARN
    /// (`arn:aws:elasticloadbalancing:<region>:<account>:targetgroup/<name>/<id>`).
    pub fn target_group_name(&self) -> Option<&str> {
        let (_, resource) = self.value.split_once(":targetgroup/")?;
        resource.split('/').next().filter(|name| !name.is_empty())
    }
}
