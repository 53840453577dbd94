// ABOUTME: ECS resource name validation for clusters and services.
// ABOUTME: Names are 1-255 ASCII letters, digits, hyphens and underscores.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

const MAX_LEN: usize = 255;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResourceNameError {
    #[error("resource name cannot be empty")]
    Empty,

    #[error("resource name exceeds maximum length of 255 characters")]
    TooLong,

    #[error("invalid character in resource name: '{0}'")]
    InvalidChar(char),
}

/// Validated name of an ECS cluster or service.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceName(String);

impl ResourceName {
    pub fn new(value: &str) -> Result<Self, ResourceNameError> {
        if value.is_empty() {
            return Err(ResourceNameError::Empty);
        }

        if value.len() > MAX_LEN {
            return Err(ResourceNameError::TooLong);
        }

        if let Some(c) = value
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_')
        {
            return Err(ResourceNameError::InvalidChar(c));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for ResourceName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ResourceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for ResourceName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ResourceName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ResourceName::new(&s).map_err(serde::de::Error::custom)
    }
}
